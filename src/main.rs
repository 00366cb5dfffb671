use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use colored::Colorize;
use itertools::Itertools;
use tracing::{debug, info};

use coursedesk::auth::StaticTokenAuth;
use coursedesk::builder::{CourseBuilder, CourseManifest, ObjectUrlRegistry};
use coursedesk::common::notify::{self, ConsoleNotifier, Notifier};
use coursedesk::metrics;
use coursedesk::models::{Course, ImageFile};
use coursedesk::state::AuthTransition;
use coursedesk::{ApiClient, AppConfig, AppContext};

mod cli;

type Ctx = AppContext<ApiClient, StaticTokenAuth>;

/// 打印课程目录
async fn show_catalog(ctx: &Ctx) -> anyhow::Result<()> {
    ctx.fetch_all_courses().await?;
    let courses = ctx.courses();

    notify::title("课程目录");
    if courses.is_empty() {
        println!("暂无课程");
    }
    for course in &courses {
        print_course_line(ctx.currency(), course);
    }
    notify::separator();
    Ok(())
}

fn print_course_line(currency: &str, course: &Course) {
    let educator = course
        .educator
        .as_ref()
        .map(|e| e.display_name().to_string())
        .unwrap_or_default();
    println!(
        "{} {} {}",
        course.id.bright_black(),
        course.title.bold(),
        educator.cyan()
    );
    println!(
        "    ★ {:.1} ({})  {}  {} 课时  {}",
        metrics::average_rating(course),
        course.ratings.len(),
        metrics::course_duration(course),
        metrics::lecture_count(course),
        metrics::format_price(currency, metrics::discounted_price(course)).green()
    );
}

/// 打印单门课程的章节结构
async fn show_course(ctx: &Ctx, id: &str) -> anyhow::Result<()> {
    let course = ctx.fetch_course(id).await?;

    notify::title(&course.title);
    print_course_line(ctx.currency(), &course);
    for chapter in course.chapters.iter().sorted_by_key(|c| c.order) {
        println!(
            "\n{} {} ({}, {} 课时)",
            format!("{}.", chapter.order).bold(),
            chapter.title.bold(),
            metrics::chapter_duration(chapter),
            chapter.lectures.len()
        );
        for lecture in chapter.lectures.iter().sorted_by_key(|l| l.order) {
            let preview = if lecture.preview_free {
                "免费试看".yellow().to_string()
            } else {
                String::new()
            };
            println!(
                "    {}. {} [{}] {}",
                lecture.order,
                lecture.title,
                metrics::humanize_minutes(lecture.duration as u64),
                preview
            );
        }
    }
    notify::separator();
    Ok(())
}

/// 打印当前用户与已报名课程
async fn show_me(ctx: &Ctx) -> anyhow::Result<()> {
    let transition = ctx.sync_with_auth().await?;
    if transition != AuthTransition::SignedIn {
        return Err(anyhow!("未登录，请设置 COURSEDESK_TOKEN 与 COURSEDESK_USER_ID"));
    }

    let snapshot = ctx.snapshot();
    let user = snapshot
        .user
        .ok_or_else(|| anyhow!("未能加载用户资料"))?;

    notify::title("我的学习");
    println!("{} {} <{}>", "👤".green().bold(), user.name.bold(), user.email);
    if snapshot.is_educator {
        println!("{}", "讲师".magenta());
    }
    notify::separator();
    if snapshot.enrolled_courses.is_empty() {
        println!("尚未报名任何课程");
    }
    for course in &snapshot.enrolled_courses {
        print_course_line(ctx.currency(), course);
    }
    Ok(())
}

async fn become_educator(ctx: &Ctx) -> anyhow::Result<()> {
    ctx.sync_with_auth().await?;
    ctx.become_educator().await?;
    Ok(())
}

/// 读取描述文件，驱动建课工具并提交
async fn add_course(
    ctx: &Ctx,
    notifier: Arc<dyn Notifier>,
    manifest_path: &Path,
    thumbnail: Option<&Path>,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("无法读取课程描述文件 {:?}", manifest_path))?;
    let manifest = CourseManifest::from_json(&raw).context("课程描述文件格式错误")?;
    debug!("课程描述: {:?}", manifest);

    let mut builder = CourseBuilder::new(notifier, Arc::new(ObjectUrlRegistry::new()));
    manifest.apply(&mut builder)?;

    // 描述文件里的相对路径以其所在目录为基准
    let image_path = match (thumbnail, manifest.thumbnail.as_ref()) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(path)) => Some(
            manifest_path
                .parent()
                .map(|dir| dir.join(path))
                .unwrap_or_else(|| path.clone()),
        ),
        (None, None) => None,
    };
    if let Some(path) = image_path {
        let image = ImageFile::from_path(&path)
            .await
            .with_context(|| format!("无法读取封面 {:?}", path))?;
        builder.set_thumbnail(image)?;
    }

    let message = builder.submit(ctx.api().as_ref(), ctx.auth().as_ref()).await?;
    info!("{}", message);

    // 以服务端为准，重新拉取目录
    ctx.fetch_all_courses().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // 初始化日志
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = AppConfig::from_env()?.with_backend_url(args.backend_url.clone());
    info!("后端地址: {}", config.backend_url);

    let api = Arc::new(ApiClient::new(config.backend_url.clone())?);
    let auth = Arc::new(config.auth_provider());
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let ctx = AppContext::new(api, auth, Arc::clone(&notifier), config.currency.clone());

    match &args.command {
        cli::Command::Catalog => show_catalog(&ctx).await,
        cli::Command::Course { id } => show_course(&ctx, id).await,
        cli::Command::Me => show_me(&ctx).await,
        cli::Command::BecomeEducator => become_educator(&ctx).await,
        cli::Command::AddCourse {
            manifest,
            thumbnail,
        } => add_course(&ctx, notifier, manifest, thumbnail.as_deref()).await,
    }
}
