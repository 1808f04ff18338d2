//! Unauthenticated read-only views for the passive display consumer.
//! Capped at the 10 most recent rows by creation order; a lower trust bar
//! than the API proper, so strictly read-only and free of session checks.

use axum::{
    Json,
    extract::State,
    response::Html,
};
use std::fmt::Write;
use tracing::info;

use portal_db::parse_store_timestamp;
use portal_types::api::WidgetFeed;
use portal_types::models::{Message, Update};

use crate::auth::AppState;
use crate::error::{ApiError, blocking};
use crate::updates::prune_expired;

const WIDGET_LIMIT: u32 = 10;

/// GET /widget/messages
pub async fn messages(State(state): State<AppState>) -> Result<Json<Vec<Message>>, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.recent_messages(WIDGET_LIMIT)).await?;
    Ok(Json(rows))
}

/// GET /widget/updates
pub async fn updates(State(state): State<AppState>) -> Result<Json<Vec<Update>>, ApiError> {
    let db = state.clone();
    let rows = blocking(move || {
        prune_and_log(&db)?;
        db.db.recent_updates(WIDGET_LIMIT)
    })
    .await?;
    Ok(Json(rows))
}

/// GET /widget/all — both collections fetched in one blocking closure, so
/// the response carries both results or a single error.
pub async fn all(State(state): State<AppState>) -> Result<Json<WidgetFeed>, ApiError> {
    let db = state.clone();
    let feed = blocking(move || {
        let messages = db.db.recent_messages(WIDGET_LIMIT)?;
        let updates = db.db.recent_updates(WIDGET_LIMIT)?;
        Ok(WidgetFeed { messages, updates })
    })
    .await?;
    Ok(Json(feed))
}

/// GET /widget/updates/html — severity-sorted, self-refreshing page.
pub async fn updates_html(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let db = state.clone();
    let mut rows = blocking(move || {
        prune_and_log(&db)?;
        db.db.recent_updates(WIDGET_LIMIT)
    })
    .await?;

    sort_for_display(&mut rows);
    Ok(Html(render_page(&rows)))
}

fn prune_and_log(state: &AppState) -> anyhow::Result<()> {
    let pruned = prune_expired(&state.db)?;
    if pruned > 0 {
        info!("pruned {} expired updates", pruned);
    }
    Ok(())
}

/// Fixed severity order for presentation: critical, urgent, notice, then
/// everything else; recency breaks ties.
pub(crate) fn severity_rank(status: &str) -> u8 {
    match status {
        "critical" => 0,
        "urgent" => 1,
        "notice" => 2,
        _ => 3,
    }
}

pub(crate) fn sort_for_display(rows: &mut [Update]) {
    rows.sort_by(|a, b| {
        severity_rank(&a.status)
            .cmp(&severity_rank(&b.status))
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
}

struct UrgencyStyle {
    bg: &'static str,
    border: &'static str,
    text: &'static str,
    badge: &'static str,
    badge_bg: &'static str,
    glow: &'static str,
}

fn urgency_style(status: &str) -> UrgencyStyle {
    match status {
        "critical" => UrgencyStyle {
            bg: "#FF1744",
            border: "#FF5252",
            text: "#FFFFFF",
            badge: "#FFFFFF",
            badge_bg: "#B71C1C",
            glow: "0 0 20px rgba(255, 23, 68, 0.6), 0 0 40px rgba(255, 23, 68, 0.3)",
        },
        "urgent" => UrgencyStyle {
            bg: "#FF9100",
            border: "#FFB74D",
            text: "#000000",
            badge: "#000000",
            badge_bg: "#FF6D00",
            glow: "none",
        },
        _ => UrgencyStyle {
            bg: "#2E7D32",
            border: "#4CAF50",
            text: "#FFFFFF",
            badge: "#FFFFFF",
            badge_bg: "#1B5E20",
            glow: "none",
        },
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// "Oct 5, 3:42 PM" style, from the update's own timestamp with created_at
/// as fallback; raw text if neither parses.
fn format_time(update: &Update) -> String {
    parse_store_timestamp(&update.timestamp)
        .or_else(|| parse_store_timestamp(&update.created_at))
        .map(|t| t.format("%b %-d, %-I:%M %p").to_string())
        .unwrap_or_else(|| update.timestamp.clone())
}

fn render_card(update: &Update) -> String {
    let style = urgency_style(&update.status);
    let is_critical = update.status == "critical";
    format!(
        r#"<div class="update-card{pulse_class}" style="background: {bg}; border: 2px solid {border}; border-radius: 12px; padding: 1.25rem; margin-bottom: 1rem; box-shadow: {glow};{pulse_anim}">
  <div style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 0.75rem;">
    <span style="font-weight: 700; font-size: 1.1rem; color: {text};">{name}</span>
    <span style="background: {badge_bg}; color: {badge}; padding: 0.3rem 0.75rem; border-radius: 20px; font-size: 0.8rem; font-weight: 600; text-transform: uppercase; letter-spacing: 0.5px;">{status}</span>
  </div>
  <div style="color: {text}; font-size: 1.15rem; line-height: 1.5; margin-bottom: 0.5rem;">{body}</div>
  <div style="color: {text}; opacity: 0.8; font-size: 0.85rem;">{time}</div>
</div>
"#,
        pulse_class = if is_critical { " critical-pulse" } else { "" },
        pulse_anim = if is_critical { " animation: pulse 1.5s infinite;" } else { "" },
        bg = style.bg,
        border = style.border,
        glow = style.glow,
        text = style.text,
        badge = style.badge,
        badge_bg = style.badge_bg,
        name = escape_html(&update.name),
        status = escape_html(&update.status),
        body = escape_html(&update.text),
        time = escape_html(&format_time(update)),
    )
}

pub(crate) fn render_page(rows: &[Update]) -> String {
    let mut cards = String::new();
    for update in rows {
        // write! to a String is infallible
        let _ = write!(cards, "{}", render_card(update));
    }
    if rows.is_empty() {
        cards = r#"<div style="text-align: center; padding: 3rem; color: #9CA3AF; font-size: 1.2rem;">No updates to display</div>"#
            .to_string();
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta http-equiv="refresh" content="30">
  <title>Quick Updates Widget</title>
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ font-family: 'Inter', sans-serif; background: #111827; min-height: 100vh; padding: 1.5rem; }}
    .container {{ max-width: 800px; margin: 0 auto; }}
    .header {{ text-align: center; margin-bottom: 1.5rem; color: #F3F4F6; }}
    .header h1 {{ font-size: 1.75rem; font-weight: 700; margin-bottom: 0.25rem; }}
    .header p {{ color: #9CA3AF; font-size: 0.9rem; }}
    @keyframes pulse {{
      0%, 100% {{ opacity: 1; transform: scale(1); }}
      50% {{ opacity: 0.9; transform: scale(1.01); }}
    }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>Team Updates</h1>
      <p>Auto-refreshes every 30 seconds</p>
    </div>
{cards}  </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: i64, status: &str, created_at: &str) -> Update {
        Update {
            id,
            name: format!("author-{id}"),
            status: status.to_string(),
            text: format!("text-{id}"),
            timestamp: created_at.to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn severity_order_is_fixed() {
        assert!(severity_rank("critical") < severity_rank("urgent"));
        assert!(severity_rank("urgent") < severity_rank("notice"));
        assert!(severity_rank("notice") < severity_rank("whatever"));
    }

    #[test]
    fn sorts_by_severity_then_recency() {
        let mut rows = vec![
            update(1, "notice", "2026-08-20T10:00:00Z"),
            update(2, "critical", "2026-08-20T09:00:00Z"),
            update(3, "urgent", "2026-08-20T11:00:00Z"),
            update(4, "notice", "2026-08-20T12:00:00Z"),
        ];
        sort_for_display(&mut rows);
        let ids: Vec<i64> = rows.iter().map(|u| u.id).collect();
        // critical first regardless of insertion order; notices by recency
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn page_renders_cards_in_display_order() {
        let mut rows = vec![
            update(1, "notice", "2026-08-20T10:00:00Z"),
            update(2, "critical", "2026-08-20T10:00:00Z"),
            update(3, "urgent", "2026-08-20T10:00:00Z"),
        ];
        sort_for_display(&mut rows);
        let page = render_page(&rows);

        let critical = page.find("author-2").unwrap();
        let urgent = page.find("author-3").unwrap();
        let notice = page.find("author-1").unwrap();
        assert!(critical < urgent);
        assert!(urgent < notice);
        assert!(page.contains(r#"http-equiv="refresh" content="30""#));
    }

    #[test]
    fn empty_page_has_placeholder() {
        let page = render_page(&[]);
        assert!(page.contains("No updates to display"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut u = update(1, "notice", "2026-08-20T10:00:00Z");
        u.text = "<script>alert('x')</script>".to_string();
        let page = render_page(&[u]);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
