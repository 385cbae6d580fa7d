//! crates/roadmap_core/src/render.rs
//!
//! Renders a roadmap and its completion state as a markdown document.
//!
//! The output depends only on the tree and the topic, so rendering the same
//! state twice yields byte-identical text.

use crate::domain::{Day, ItemCategory, Phase, Resource, Roadmap, Week};
use crate::progress;

const PROGRESS_BAR_WIDTH: u32 = 20;

fn heading(level: usize, text: &str) -> String {
    format!("{} {}", "#".repeat(level), text).trim().to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A fixed-width bar of `█` and `░` cells proportional to `percent`.
pub fn progress_bar(percent: u32) -> String {
    let percent = percent.min(100);
    let filled = ((percent * PROGRESS_BAR_WIDTH + 50) / 100) as usize;
    let empty = PROGRESS_BAR_WIDTH as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// The first and last week a phase covers. Falls back to the declared
/// range when the phase has no weeks.
pub fn phase_week_range(phase: &Phase) -> (u32, u32) {
    let numbers = phase.weeks.iter().map(|week| week.week_number);
    match (numbers.clone().min(), numbers.max()) {
        (Some(start), Some(end)) => (start, end),
        _ => (phase.start_week.unwrap_or(1), phase.end_week.unwrap_or(1)),
    }
}

fn resource_lines(resources: &[Resource]) -> Vec<String> {
    let mut lines = vec![heading(5, "📚 Resources")];
    for resource in resources {
        let mut label = resource.title.clone();
        if let Some(provider) = &resource.provider {
            label.push_str(&format!(" ({provider})"));
        }
        if let Some(kind) = &resource.kind {
            label.push_str(&format!(" [{kind}]"));
        }
        if resource.url.is_empty() {
            lines.push(format!("- {label}"));
        } else {
            lines.push(format!("- [{label}]({})", resource.url));
        }
    }
    lines
}

fn day_lines(week_number: u32, day: &Day, level: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let title = if day.title.is_empty() {
        format!("Day {}", day.day_number)
    } else {
        day.title.clone()
    };
    let check = if day.completed { "☑" } else { "☐" };
    let badge = if day.xp_reward > 0 {
        format!(" | 🏆 {} XP", day.xp_reward)
    } else {
        String::new()
    };
    lines.push(heading(
        level,
        &format!("{check} Week {week_number} – Day {}: {title}{badge}", day.day_number),
    ));

    if let Some(hours) = day.time_estimate_hours.filter(|h| *h != 0.0 && !h.is_nan()) {
        lines.push(format!("⏱️ _~{hours:.1} hours total_"));
    }

    for category in ItemCategory::ALL {
        let items = day.items_in(category);
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(heading(level + 1, &format!("{} {}", category.emoji(), category.label())));
        for item in items {
            let checkbox = if item.completed { "[x]" } else { "[ ]" };
            let xp = if item.xp > 0 {
                format!(" _(+{} XP)_", item.xp)
            } else {
                String::new()
            };
            match item.resource.as_ref().filter(|r| !r.url.is_empty()) {
                Some(resource) => {
                    let mut label = if resource.title.is_empty() {
                        "Resource".to_string()
                    } else {
                        resource.title.clone()
                    };
                    if let Some(provider) = &resource.provider {
                        label.push_str(&format!(" ({provider})"));
                    }
                    lines.push(format!(
                        "- {checkbox} {}{xp} — [{label}]({})",
                        item.description, resource.url
                    ));
                }
                None => lines.push(format!("- {checkbox} {}{xp}", item.description)),
            }
        }
    }
    lines
}

fn week_lines(week: &Week) -> Vec<String> {
    let mut lines = Vec::new();
    let percent = progress::week_progress(week);
    let check = if percent == 100 { "☑" } else { "☐" };

    lines.push(heading(
        3,
        &format!("{check} Week {} – {} | {percent}%", week.week_number, week.theme),
    ));
    lines.push(format!("**Weekly Outcome:** {}", week.outcome));
    lines.push(format!("**Week XP:** {} 🏆", week.week_xp));
    if let Some(summary) = non_empty(&week.summary) {
        lines.push(String::new());
        lines.push(summary.to_string());
    }

    let mut days: Vec<&Day> = week.days.iter().collect();
    days.sort_by_key(|day| day.day_number);
    for day in days {
        lines.push(String::new());
        lines.extend(day_lines(week.week_number, day, 4));
    }

    if !week.quiz_questions.is_empty() {
        lines.push(String::new());
        lines.push(heading(4, "📝 Week Quiz"));
        for (idx, question) in week.quiz_questions.iter().enumerate() {
            lines.push(format!("{}. {question}", idx + 1));
        }
    }

    if !week.weekly_resources.is_empty() {
        lines.push(String::new());
        lines.extend(resource_lines(&week.weekly_resources));
    }

    lines.push("\n---\n".to_string());
    lines
}

fn phase_lines(phase: &Phase) -> Vec<String> {
    let mut lines = Vec::new();
    let (start, end) = phase_week_range(phase);
    let label = if start == end {
        format!("Phase {}: {} (Week {start})", phase.order, phase.name)
    } else {
        format!("Phase {}: {} (Weeks {start}–{end})", phase.order, phase.name)
    };

    lines.push(heading(
        2,
        &format!("{label} | {}% ⭐", progress::phase_progress(phase)),
    ));
    lines.push(format!("**🎯 Phase Goal:** {}", phase.goal));
    lines.push(format!("**🏆 Phase XP:** {}", phase.phase_xp));
    if let Some(milestone) = non_empty(&phase.milestone_summary) {
        lines.push(format!("**🎖️ Milestone:** {milestone}"));
    }
    lines.push(String::new());

    let mut weeks: Vec<&Week> = phase.weeks.iter().collect();
    weeks.sort_by_key(|week| week.week_number);
    for week in weeks {
        lines.extend(week_lines(week));
    }
    lines
}

/// Renders the full progress document for `roadmap`.
///
/// `topic` names the roadmap when it has no title of its own and is listed
/// in the overview.
pub fn render_document(roadmap: &Roadmap, topic: &str) -> String {
    let earned = progress::earned_xp(roadmap);
    let percent = progress::progress(roadmap);
    let mut lines = Vec::new();

    let title = if roadmap.title.is_empty() {
        format!("{topic} Roadmap")
    } else {
        roadmap.title.clone()
    };
    lines.push(heading(1, &title));
    lines.push(String::new());
    lines.push(format!(
        "> **Progress:** {percent}% | **XP Earned:** {earned} / {} 🏆",
        roadmap.total_xp
    ));
    lines.push(String::new());
    lines.push(format!("`{}` {percent}%", progress_bar(percent)));
    lines.push(String::new());

    lines.push(heading(2, "📋 Overview"));
    lines.push(format!("- **Topic:** {topic}"));
    let level = if roadmap.level.is_empty() {
        "unspecified"
    } else {
        roadmap.level.as_str()
    };
    lines.push(format!("- **Level:** {level}"));
    lines.push(format!("- **Duration:** {} weeks", roadmap.duration_weeks));
    lines.push(format!(
        "- **Weekly Commitment:** {} hours/week",
        roadmap.hours_per_week
    ));
    lines.push(format!("- **Total XP Available:** {} 🏆", roadmap.total_xp));
    if let Some(outcome) = non_empty(&roadmap.target_outcome) {
        lines.push(format!("- **Target Outcome:** {outcome}"));
    }
    if let Some(prerequisites) = non_empty(&roadmap.prerequisites) {
        lines.push(format!("- **Prerequisites:** {prerequisites}"));
    }
    if let Some(description) = non_empty(&roadmap.description) {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    lines.push("\n---\n".to_string());

    // Stable sort: phases sharing an order keep their original position.
    let mut phases: Vec<&Phase> = roadmap.phases.iter().collect();
    phases.sort_by_key(|phase| phase.order);
    for phase in phases {
        lines.extend(phase_lines(phase));
    }

    lines.join("\n")
}

/// File name for a downloaded document: the title lower-cased with each
/// whitespace run replaced by `-`.
pub fn export_file_name(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    if slug.is_empty() {
        slug.push_str("roadmap");
    }
    format!("{slug}.md")
}
