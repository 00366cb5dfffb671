//! 课程展示用的派生指标，全部是纯函数

use crate::models::{Chapter, Course};

/// 平均评分，保留一位小数；没有评分时为 0
pub fn average_rating(course: &Course) -> f64 {
    if course.ratings.is_empty() {
        return 0.0;
    }
    let total: f64 = course.ratings.iter().map(|r| r.rating).sum();
    round_to(total / course.ratings.len() as f64, 1)
}

pub fn chapter_minutes(chapter: &Chapter) -> u64 {
    chapter.lectures.iter().map(|l| l.duration as u64).sum()
}

pub fn course_minutes(course: &Course) -> u64 {
    course.chapters.iter().map(chapter_minutes).sum()
}

/// 章节总时长，如 "1h 5m"
pub fn chapter_duration(chapter: &Chapter) -> String {
    humanize_minutes(chapter_minutes(chapter))
}

/// 课程总时长
pub fn course_duration(course: &Course) -> String {
    humanize_minutes(course_minutes(course))
}

pub fn lecture_count(course: &Course) -> usize {
    course.chapters.iter().map(|c| c.lectures.len()).sum()
}

// 为零的部分省略，全为零时输出 "0m"
pub fn humanize_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// 折后价，保留两位小数
pub fn discounted_price(course: &Course) -> f64 {
    let discount = course.discount.clamp(0.0, 100.0);
    round_to(course.price - discount * course.price / 100.0, 2)
}

pub fn format_price(currency: &str, amount: f64) -> String {
    format!("{}{:.2}", currency, amount)
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
