// src/models/tool.rs

use crate::constants::{layout, templates};
use clap::ValueEnum;
use itertools::Itertools;
use std::{fmt, path::Path};

/// 用户可选择的下载方式
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    #[value(name = "yt-video", alias = "Youtube-DL-Video")]
    VideoDownload,
    #[value(name = "yt-audio", alias = "Youtube-DL-Audio")]
    AudioExtract,
    #[value(name = "gallery", alias = "Gallery-DL")]
    GalleryDownload,
    #[value(name = "spotdl", alias = "Spot-DL")]
    MusicDownload,
    #[value(name = "other-video", alias = "Other-Videos")]
    GenericVideo,
    #[value(name = "auto", alias = "Automatic")]
    Automatic,
}

/// 实际被调用的外部程序
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Program {
    YtDlp,
    GalleryDl,
    SpotDl,
}

impl Program {
    pub const ALL: [Program; 3] = [Program::YtDlp, Program::GalleryDl, Program::SpotDl];

    pub fn executable(&self) -> &'static str {
        match self {
            Program::YtDlp => "yt-dlp",
            Program::GalleryDl => "gallery-dl",
            Program::SpotDl => "spotdl",
        }
    }

    /// PyPI 上的包名，用于查询最新版本
    pub fn package(&self) -> &'static str {
        self.executable()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

impl ToolKind {
    /// 除 Automatic 之外的全部具体后端，顺序即界面展示顺序
    pub const CONCRETE: [ToolKind; 5] = [
        ToolKind::VideoDownload,
        ToolKind::AudioExtract,
        ToolKind::GalleryDownload,
        ToolKind::MusicDownload,
        ToolKind::GenericVideo,
    ];

    /// 接受命令行取值或显示名称，大小写不敏感。
    pub fn from_identifier(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s.trim(), true).ok()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::VideoDownload => "Youtube-DL-Video",
            ToolKind::AudioExtract => "Youtube-DL-Audio",
            ToolKind::GalleryDownload => "Gallery-DL",
            ToolKind::MusicDownload => "Spot-DL",
            ToolKind::GenericVideo => "Other-Videos",
            ToolKind::Automatic => "Automatic",
        }
    }

    pub fn cli_name(&self) -> &'static str {
        match self {
            ToolKind::VideoDownload => "yt-video",
            ToolKind::AudioExtract => "yt-audio",
            ToolKind::GalleryDownload => "gallery",
            ToolKind::MusicDownload => "spotdl",
            ToolKind::GenericVideo => "other-video",
            ToolKind::Automatic => "auto",
        }
    }

    pub fn is_concrete(&self) -> bool {
        !matches!(self, ToolKind::Automatic)
    }

    pub fn program(&self) -> Option<Program> {
        match self {
            ToolKind::VideoDownload | ToolKind::AudioExtract | ToolKind::GenericVideo => {
                Some(Program::YtDlp)
            }
            ToolKind::GalleryDownload => Some(Program::GalleryDl),
            ToolKind::MusicDownload => Some(Program::SpotDl),
            ToolKind::Automatic => None,
        }
    }

    /// 相对于下载目录的输出子目录。gallery-dl 会在 `-d` 目录下自行创建 `gallery-dl/<站点>`。
    pub fn output_subdir(&self) -> Option<&'static str> {
        match self {
            ToolKind::VideoDownload => Some(layout::VIDEO),
            ToolKind::AudioExtract => Some(layout::AUDIO),
            ToolKind::GalleryDownload => Some(layout::DOWNLOADED),
            ToolKind::MusicDownload => Some(layout::MUSIC),
            ToolKind::GenericVideo => Some(layout::OTHER_VIDEOS),
            ToolKind::Automatic => None,
        }
    }

    /// 由固定模板构造外部命令。Automatic 没有模板，需先经过解析。
    ///
    /// 给出 `ytdlp_config` 时，所有 yt-dlp 命令都以 `--config-location <文件>` 开头。
    pub fn command(&self, url: &str, base: &Path, ytdlp_config: Option<&Path>) -> Option<CommandSpec> {
        let out_dir = base.join(self.output_subdir()?).to_string_lossy().into_owned();
        let program = self.program()?;
        let mut args: Vec<String> = match (program, ytdlp_config) {
            (Program::YtDlp, Some(conf)) => {
                vec!["--config-location".into(), conf.to_string_lossy().into_owned()]
            }
            _ => Vec::new(),
        };
        let template: Vec<String> = match self {
            ToolKind::VideoDownload => vec![
                "-f".into(),
                templates::YTDLP_VIDEO_FORMAT.into(),
                "-o".into(),
                templates::YTDLP_OUTPUT.into(),
                "-P".into(),
                out_dir,
                url.into(),
            ],
            ToolKind::AudioExtract => vec![
                "-x".into(),
                "--audio-format".into(),
                templates::YTDLP_AUDIO_FORMAT.into(),
                "-o".into(),
                templates::YTDLP_OUTPUT.into(),
                "-P".into(),
                out_dir,
                url.into(),
            ],
            ToolKind::GalleryDownload => vec!["-d".into(), out_dir, url.into()],
            ToolKind::MusicDownload => vec![
                "download".into(),
                url.into(),
                "--output".into(),
                Path::new(&out_dir)
                    .join(templates::SPOTDL_OUTPUT)
                    .to_string_lossy()
                    .into_owned(),
            ],
            ToolKind::GenericVideo => vec![
                "-o".into(),
                templates::YTDLP_OUTPUT.into(),
                "-P".into(),
                out_dir,
                url.into(),
            ],
            ToolKind::Automatic => return None,
        };
        args.extend(template);
        Some(CommandSpec::new(program.executable(), args))
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 一条完整的外部命令：程序名加有序参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_values_and_display_names() {
        assert_eq!(ToolKind::from_identifier("yt-audio"), Some(ToolKind::AudioExtract));
        assert_eq!(ToolKind::from_identifier("Gallery-DL"), Some(ToolKind::GalleryDownload));
        assert_eq!(ToolKind::from_identifier(" spot-dl "), Some(ToolKind::MusicDownload));
        assert_eq!(ToolKind::from_identifier("AUTOMATIC"), Some(ToolKind::Automatic));
        assert_eq!(ToolKind::from_identifier("wget"), None);
    }

    #[test]
    fn test_every_concrete_tool_has_a_template() {
        let base = Path::new("/data/FeliciaDL");
        for tool in ToolKind::CONCRETE {
            let cmd = tool.command("https://example.com/v", base, None).unwrap();
            assert_eq!(cmd.program, tool.program().unwrap().executable());
            assert!(cmd.args.iter().any(|a| a.contains("https://example.com/v")));
        }
        assert!(ToolKind::Automatic.command("https://example.com/v", base, None).is_none());
    }

    #[test]
    fn test_spotdl_output_template() {
        let cmd = ToolKind::MusicDownload
            .command("https://open.spotify.com/track/xyz", Path::new("/base"), Some(Path::new("/cfg/yt-dlp.conf")))
            .unwrap();
        assert_eq!(cmd.args[0], "download");
        assert_eq!(cmd.args[1], "https://open.spotify.com/track/xyz");
        assert_eq!(cmd.args[3], "/base/downloaded/spotdl/{track_name}.{output_ext}");
    }

    #[test]
    fn test_ytdlp_templates_start_with_config_location() {
        let conf = Path::new("/cfg/yt-dlp.conf");
        for tool in [ToolKind::VideoDownload, ToolKind::AudioExtract, ToolKind::GenericVideo] {
            let cmd = tool.command("https://example.com/v", Path::new("/base"), Some(conf)).unwrap();
            assert_eq!(cmd.program, "yt-dlp");
            assert_eq!(&cmd.args[..2], &["--config-location", "/cfg/yt-dlp.conf"]);
            assert_eq!(cmd.args.last().map(String::as_str), Some("https://example.com/v"));
        }

        let gallery = ToolKind::GalleryDownload
            .command("https://example.com/v", Path::new("/base"), Some(conf))
            .unwrap();
        assert_eq!(gallery.args[0], "-d");

        let plain = ToolKind::VideoDownload
            .command("https://example.com/v", Path::new("/base"), None)
            .unwrap();
        assert_eq!(plain.args[0], "-f");
    }
}
