use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

/// 在线课程平台命令行客户端
#[derive(Parser, Debug)]
#[command(name = "coursedesk")]
#[command(version)]
#[command(author = "rpeng252@gmail.com")]
#[command(about = "浏览课程目录、查看学习面板、发布新课程", long_about = None)]
pub struct Cli {
    /// 后端地址，覆盖 COURSEDESK_BACKEND_URL
    #[arg(long, value_name = "URL", global = true)]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub backend_url: Option<Url>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 列出全部已发布课程
    Catalog,

    /// 查看单门课程的章节与课时
    Course {
        #[arg(value_name = "COURSE_ID")]
        id: String,
    },

    /// 查看当前用户资料与已报名课程
    Me,

    /// 申请成为讲师
    BecomeEducator,

    /// 按课程描述文件发布新课程
    AddCourse {
        /// 课程描述文件 (JSON)
        #[arg(long, value_name = "FILE")]
        #[arg(value_hint = clap::ValueHint::FilePath)]
        manifest: PathBuf,

        /// 封面图片，覆盖描述文件中的 thumbnail
        #[arg(long, value_name = "IMAGE")]
        #[arg(value_hint = clap::ValueHint::FilePath)]
        thumbnail: Option<PathBuf>,
    },
}
