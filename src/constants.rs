// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const URL_TRUNCATE_LENGTH: usize = 60;
pub const APP_DIR_NAME: &str = clap::crate_name!();
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const MAPPING_FILE_NAME: &str = "automatic.json";
pub const YTDLP_CONFIG_FILE_NAME: &str = "yt-dlp.conf";
pub const YTDLP_CONFIG_TEMPLATE: &str = "# yt-dlp config file\n";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_DIR_NAME: &str = "FeliciaDL";
pub const DEFAULT_BULK_DELAY_SECS: u64 = 5;
pub const VERSION_PROBE_TIMEOUT_SECS: u64 = 20;

/// 下载目录下的固定布局
pub mod layout {
    pub const DOWNLOADED: &str = "downloaded";
    pub const VIDEO: &str = "downloaded/youtube-dl-video";
    pub const AUDIO: &str = "downloaded/youtube-dl-audio";
    pub const MUSIC: &str = "downloaded/spotdl";
    pub const OTHER_VIDEOS: &str = "downloaded/other-videos";
    pub const LOG_DIR: &str = "log";
    pub const DOWNLOAD_LOG: &str = "download.log";
}

pub mod templates {
    pub const YTDLP_OUTPUT: &str = "%(title)s.%(ext)s";
    pub const YTDLP_VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]";
    pub const YTDLP_AUDIO_FORMAT: &str = "mp3";
    pub const SPOTDL_OUTPUT: &str = "{track_name}.{output_ext}";
}

pub const HELP_INTERACTIVE: &str = r#"
<链接>              使用当前工具下载该链接
tool <名称>         切换工具: yt-video, yt-audio, gallery, spotdl, other-video, auto
bulk                进入批量模式，逐行输入链接，空行结束并开始下载
jobs                列出正在运行的任务
stop [编号]         停止指定任务 (需确认)，只有一个任务时可省略编号
dir <路径>          修改下载目录 (任务运行期间不可修改)
dir reset           恢复默认下载目录
theme <名称>        切换主题: auto, color, plain (任务运行期间不可修改)
versions            检查外部工具的已安装版本与最新版本
config              显示当前配置与自动模式映射
help                显示本帮助
quit                退出 (会停止所有正在运行的任务)"#;
