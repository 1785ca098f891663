use anifin_scanner::normalize;

#[test]
fn extracts_titles_from_common_release_names() {
    for (raw, expected) in [
        ("[Group] Show Name - 01 [1080p].mkv", "Show Name"),
        ("[SubsPlease] Jujutsu Kaisen - 24 (1080p) [A1B2C3D4].mkv", "Jujutsu Kaisen"),
        ("[Erai-raws] Spy x Family - 12 [720p][Multiple Subtitle].mkv", "Spy x Family"),
        ("[HorribleSubs] One Punch Man - 03 [480p].mkv", "One Punch Man"),
        ("Frieren.S01E05.1080p.WEB-DL.x265.mkv", "Frieren"),
        ("[Judas] Vinland Saga (Season 2) [BD 1080p][HEVC x265 10bit]", "Vinland Saga"),
        ("Made in Abyss (2017) [BD 1080p]", "Made in Abyss"),
        ("Show.Name.2019.1080p.mkv", "Show Name"),
        ("Cowboy Bebop", "Cowboy Bebop"),
    ] {
        assert_eq!(normalize(raw), expected, "normalizing {raw}");
    }
}

#[test]
fn leaves_unparseable_names_untouched() {
    for raw in ["[1080p][HEVC]", "[x264] [FLAC]", "   ", "- 01"] {
        assert_eq!(normalize(raw), raw, "should pass {raw:?} through");
    }
}

#[test]
fn strips_media_extensions_only() {
    for ext in ["mkv", "MP4", "avi", "m2ts", "webm", "ass", "srt"] {
        let raw = format!("Cowboy Bebop.{ext}");
        assert_eq!(normalize(&raw), "Cowboy Bebop", "normalizing {raw}");
    }
    assert_eq!(normalize("Dr. Stone"), "Dr. Stone");
}
