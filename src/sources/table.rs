//! Built-in mirror table.

pub const APK_MIRROR_BASE_URL: &str = "https://www.apkmirror.com";
pub const APK_MIRROR_APK_URL: &str = "https://www.apkmirror.com/apk";
pub const UPTODOWN_BASE_URL: &str = "https://{}.en.uptodown.com/android";
pub const APK_PURE_BASE_URL: &str = "https://d.apkpure.com/b/APK";
pub const APK_PURE_URL: &str = "https://d.apkpure.com/b/APK/{}?version=latest";
pub const APK_SOS_BASE_URL: &str = "https://apksos.com/download-app";
pub const APK_SOS_URL: &str = "https://apksos.com/download-app/{}";
pub const GITHUB_BASE_URL: &str = "https://github.com";

/// Where a table entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    /// `<APK_MIRROR_APK_URL>/<path>/`
    ApkMirror(&'static str),
    /// Uptodown subdomain.
    Uptodown(&'static str),
    /// Shared APKPure pattern, filled with the package name later.
    ApkPure,
    /// Shared APKSOS pattern, filled with the package name later.
    ApkSos,
}

impl Entry {
    pub(crate) fn url(self) -> String {
        match self {
            Entry::ApkMirror(path) => format!("{}/{}/", APK_MIRROR_APK_URL, path),
            Entry::Uptodown(name) => UPTODOWN_BASE_URL.replacen("{}", name, 1),
            Entry::ApkPure => APK_PURE_URL.to_string(),
            Entry::ApkSos => APK_SOS_URL.to_string(),
        }
    }
}

/// App key to mirror entry, sorted by key.
pub(crate) const SOURCES: &[(&str, Entry)] = &[
    ("androidtwelvewidgets", Entry::ApkPure),
    ("backdrops", Entry::ApkMirror("backdrops/backdrops-wallpapers")),
    ("bacon", Entry::ApkMirror("onelouder-apps/baconreader-for-reddit")),
    ("boost", Entry::ApkMirror("ruben-mayayo/boost-for-reddit")),
    ("candyvpn", Entry::ApkMirror("liondev-io/candylink-vpn")),
    ("expensemanager", Entry::ApkSos),
    ("grecorder", Entry::ApkMirror("google-inc/google-recorder")),
    ("hex-editor", Entry::ApkPure),
    ("icon_pack_studio", Entry::ApkMirror("smart-launcher-team/icon-pack-studio")),
    ("infinity", Entry::ApkMirror("docile-alligator/infinity-for-reddit")),
    (
        "inshorts",
        Entry::ApkMirror("inshorts-formerly-news-in-shorts/inshorts-news-in-60-words-2"),
    ),
    ("instagram", Entry::ApkMirror("instagram/instagram-instagram")),
    ("irplus", Entry::ApkMirror("binarymode/irplus-infrared-remote")),
    ("meme-generator-free", Entry::ApkMirror("zombodroid/meme-generator-free")),
    ("messenger", Entry::ApkMirror("facebook-2/messenger")),
    ("my-expenses", Entry::Uptodown("my-expenses")),
    ("netguard", Entry::ApkMirror("marcel-bokhorst/netguard-no-root-firewall")),
    ("nova_launcher", Entry::ApkMirror("teslacoil-software/nova-launcher")),
    ("nyx-music-player", Entry::ApkMirror("awedea/nyx-music-player")),
    ("pixiv", Entry::ApkMirror("pixiv-inc/pixiv")),
    ("reddit", Entry::ApkMirror("redditinc/reddit")),
    ("relay", Entry::ApkMirror("dbrady/relay-for-reddit-2")),
    ("rif", Entry::ApkMirror("talklittle/reddit-is-fun")),
    ("slide", Entry::ApkMirror("haptic-apps/slide-for-reddit")),
    ("sonyheadphone", Entry::ApkMirror("sony-corporation/sony-headphones-connect")),
    ("spotify", Entry::Uptodown("spotify")),
    ("sync", Entry::ApkMirror("red-apps-ltd/sync-for-reddit")),
    ("tasker", Entry::ApkMirror("joaomgcd/tasker-crafty-apps-eu")),
    (
        "ticktick",
        Entry::ApkMirror("appest-inc/ticktick-to-do-list-with-reminder-day-planner"),
    ),
    ("tiktok", Entry::ApkMirror("tiktok-pte-ltd/tik-tok-including-musical-ly")),
    ("trakt", Entry::ApkMirror("trakt/trakt")),
    ("twitch", Entry::ApkMirror("twitch-interactive-inc/twitch")),
    ("twitter", Entry::ApkMirror("x-corp/twitter")),
    ("vsco", Entry::ApkMirror("vsco/vsco-cam")),
    ("warnwetter", Entry::ApkMirror("deutscher-wetterdienst/warnwetter")),
    ("windy", Entry::ApkMirror("windy-weather-world-inc/windy-wind-weather-forecast")),
    ("youtube", Entry::ApkMirror("google-inc/youtube")),
    ("youtube_music", Entry::ApkMirror("google-inc/youtube-music")),
    ("yuka", Entry::ApkMirror("yuka-apps/yuka-food-cosmetic-scan")),
];

pub(crate) fn lookup(app: &str) -> Option<Entry> {
    SOURCES
        .binary_search_by(|(key, _)| (*key).cmp(app))
        .ok()
        .map(|idx| SOURCES[idx].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(SOURCES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_apkmirror_url() {
        assert_eq!(
            lookup("youtube").unwrap().url(),
            "https://www.apkmirror.com/apk/google-inc/youtube/"
        );
    }

    #[test]
    fn test_uptodown_url() {
        assert_eq!(
            lookup("spotify").unwrap().url(),
            "https://spotify.en.uptodown.com/android"
        );
    }

    #[test]
    fn test_unknown_app() {
        assert!(lookup("not-an-app").is_none());
    }
}
