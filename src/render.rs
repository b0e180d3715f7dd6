// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML pages for the 800x480 e-ink display and the browser OAuth flow.
//!
//! Every page is a complete document with inline styles; the display
//! fetches nothing besides the title bar icon.

use crate::models::{DashboardView, HrvPoint};
use crate::services::dashboard::TREND_DAYS;
use crate::time_utils::format_display;
use chrono::{Datelike, Utc};

// ─── HRV chart geometry (SVG viewBox 300x150) ───────────────────

const CHART_LEFT: f64 = 10.0;
const CHART_SLOT_WIDTH: f64 = 42.85;
const CHART_BOTTOM: f64 = 150.0;
const CHART_HEIGHT: f64 = 120.0;
/// Vertical range used when every point has the same value.
const FLAT_RANGE: f64 = 10.0;

/// Render the four-panel recovery dashboard.
pub fn render_dashboard(view: &DashboardView) -> String {
    let deficit = if view.sleep_deficit_hours < 0.0 {
        format!("Sleep Deficit: {} hours", view.sleep_deficit_hours.abs())
    } else {
        format!("Sleep Surplus: {} hours", view.sleep_deficit_hours)
    };
    let percent = sleep_fill_percent(view.sleep_actual_milli, view.sleep_needed_milli);

    DASHBOARD_HTML
        .replace("{{BASE_CSS}}", BASE_CSS)
        .replace("{{TITLE_BAR}}", &title_bar("Daily Status"))
        .replace("{{SCORE}}", &format!("{:.0}", view.recovery_score))
        .replace("{{STATUS}}", view.recovery_status.label())
        .replace("{{COLOR}}", view.recovery_status.color_tag())
        .replace("{{UPDATED}}", &format_display(view.last_updated))
        .replace("{{HRV_CHART}}", &hrv_chart_svg(&view.hrv_trend))
        .replace("{{HRV_CURRENT}}", &format!("{:.0}", view.hrv_current))
        .replace("{{RHR}}", &format!("{:.0}", view.resting_heart_rate))
        .replace("{{SLEEP_HOURS}}", &view.sleep_hours_label)
        .replace("{{SLEEP_NEEDED}}", &view.sleep_needed_label)
        .replace("{{SLEEP_PERCENT}}", &format!("{:.1}", percent))
        .replace("{{SLEEP_DEFICIT}}", &deficit)
}

/// Render the "connect your account" page shown until tokens exist.
///
/// `auth_url` is inserted verbatim so it stays copyable; `WhoopClient`
/// percent-encodes every query value, so it carries no markup.
pub fn render_auth_prompt(auth_url: &str) -> String {
    AUTH_HTML
        .replace("{{BASE_CSS}}", BASE_CSS)
        .replace("{{TITLE_BAR}}", &title_bar("Authentication"))
        .replace("{{AUTH_URL}}", auth_url)
}

/// Render an error page. The caller still answers with 200 so the display
/// shows it.
pub fn render_error(message: &str, detail: Option<&str>) -> String {
    let detail_html = detail
        .map(|d| format!(r#"<div class="error-details">{}</div>"#, escape_html(d)))
        .unwrap_or_default();

    ERROR_HTML
        .replace("{{BASE_CSS}}", BASE_CSS)
        .replace("{{TITLE_BAR}}", &title_bar("Error"))
        .replace("{{MESSAGE}}", &escape_html(message))
        .replace("{{DETAIL}}", &detail_html)
        .replace("{{ATTEMPT}}", &format_display(Utc::now()))
}

/// Landing page with the connect link.
pub fn render_home(auth_path: &str) -> String {
    HOME_HTML.replace("{{AUTH_PATH}}", &escape_html(auth_path))
}

/// Confirmation page after a successful OAuth callback.
pub fn render_auth_success() -> String {
    SUCCESS_HTML.to_string()
}

/// Chart coordinates for each trend point.
///
/// Points sit in seven fixed slots left to right regardless of how many
/// exist. The lowest value maps to the bottom, the highest to the top.
pub fn hrv_chart_points(trend: &[HrvPoint]) -> Vec<(f64, f64)> {
    let min = trend.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = trend.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { FLAT_RANGE };

    trend
        .iter()
        .take(TREND_DAYS)
        .enumerate()
        .map(|(i, point)| {
            let normalized = (point.value - min) / range;
            (
                CHART_LEFT + i as f64 * CHART_SLOT_WIDTH,
                CHART_BOTTOM - normalized * CHART_HEIGHT,
            )
        })
        .collect()
}

/// Percentage of needed sleep achieved, by whole minutes, capped at 100.
pub fn sleep_fill_percent(actual_milli: u64, needed_milli: u64) -> f64 {
    let actual_minutes = actual_milli / 60_000;
    let needed_minutes = needed_milli / 60_000;

    if needed_minutes == 0 {
        return if actual_minutes > 0 { 100.0 } else { 0.0 };
    }
    (actual_minutes as f64 / needed_minutes as f64 * 100.0).min(100.0)
}

fn hrv_chart_svg(trend: &[HrvPoint]) -> String {
    let points = hrv_chart_points(trend);
    let mut svg = String::new();

    for (i, point) in trend.iter().take(TREND_DAYS).enumerate() {
        let x = CHART_LEFT + i as f64 * CHART_SLOT_WIDTH;
        let day = point.date.weekday().to_string();
        let initial = day.chars().next().unwrap_or(' ');
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="145" font-size="10" text-anchor="middle">{}</text>"#,
            x, initial
        ));
    }

    if !points.is_empty() {
        let path: Vec<String> = points
            .iter()
            .enumerate()
            .map(|(i, (x, y))| {
                let cmd = if i == 0 { 'M' } else { 'L' };
                format!("{}{:.2},{:.2}", cmd, x, y)
            })
            .collect();
        svg.push_str(&format!(
            r#"<path class="hrv-trend-line" d="{}"></path>"#,
            path.join(" ")
        ));
    }

    for (x, y) in &points {
        svg.push_str(&format!(
            r#"<circle class="hrv-trend-point" cx="{:.2}" cy="{:.2}" r="3"></circle>"#,
            x, y
        ));
    }

    svg
}

fn title_bar(instance: &str) -> String {
    TITLE_BAR_HTML.replace("{{INSTANCE}}", instance)
}

/// Escape text for inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

const BASE_CSS: &str = r#"
    body {
      font-family: 'Inter', sans-serif;
      margin: 0;
      padding: 0;
      width: 800px;
      height: 480px;
      overflow: hidden;
      background-color: white;
      color: black;
    }

    .title_bar {
      display: flex;
      align-items: center;
      padding: 0 20px;
      border-top: 1px solid #000;
      height: 40px;
    }

    .title_bar .image {
      height: 24px;
      margin-right: 10px;
    }

    .title_bar .title {
      font-weight: bold;
      margin-right: 10px;
    }

    .title_bar .instance {
      font-size: 14px;
      color: #666;
    }

    .content {
      flex: 1;
      display: flex;
      flex-direction: column;
      align-items: center;
      justify-content: center;
      padding: 40px;
      text-align: center;
    }
"#;

const TITLE_BAR_HTML: &str = r#"<div class="title_bar">
    <img class="image" src="https://usetrmnl.com/images/plugins/whoop-icon.svg" alt="WHOOP Logo" />
    <span class="title">WHOOP Recovery</span>
    <span class="instance">{{INSTANCE}}</span>
  </div>"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>WHOOP Recovery Dashboard</title>
  <style>
{{BASE_CSS}}
    .layout {
      display: grid;
      grid-template-rows: auto 40px;
      height: 100%;
    }

    .panel {
      display: grid;
      grid-template-columns: 1fr 1fr;
      grid-template-rows: 1fr 1fr;
      padding: 20px;
      gap: 20px;
    }

    .panel__section {
      border: 1px solid #000;
      padding: 15px;
      display: flex;
      flex-direction: column;
      align-items: center;
      justify-content: center;
      position: relative;
    }

    .recovery-score {
      font-size: 64px;
      font-weight: bold;
      margin: 0;
      line-height: 1;
    }

    .recovery-status {
      font-size: 18px;
      margin: 10px 0 0;
      text-align: center;
    }

    .recovery-indicator {
      width: 40px;
      height: 10px;
      margin-top: 10px;
    }

    .heart-rate {
      font-size: 48px;
      font-weight: bold;
      margin: 0;
      line-height: 1;
    }

    .hrv-trend {
      width: 100%;
      height: 120px;
    }

    .hrv-trend-line {
      stroke: black;
      stroke-width: 2;
      fill: none;
    }

    .hrv-trend-point {
      fill: black;
    }

    .hrv-trend-baseline {
      stroke: black;
      stroke-width: 1;
      stroke-dasharray: 4 4;
    }

    .sleep-progress {
      width: 100%;
      height: 20px;
      border: 1px solid #000;
      margin: 10px 0;
    }

    .sleep-progress-bar {
      height: 100%;
      background-color: #000;
    }

    .last-updated {
      position: absolute;
      bottom: 5px;
      right: 10px;
      font-size: 10px;
      color: #666;
    }

    /* E-ink has no color; bands are told apart by pattern. */
    .pattern-green {
      background: repeating-linear-gradient(45deg, #000, #000 2px, #fff 2px, #fff 4px);
    }

    .pattern-yellow {
      background: repeating-linear-gradient(90deg, #000, #000 1px, #fff 1px, #fff 3px);
    }

    .pattern-red {
      background: repeating-linear-gradient(0deg, #000, #000 1px, #fff 1px, #fff 3px);
    }
  </style>
</head>
<body>
  <div class="layout">
    <div class="panel">
      <div class="panel__section">
        <h3>Recovery Score</h3>
        <h2 class="recovery-score">{{SCORE}}%</h2>
        <p class="recovery-status">{{STATUS}}</p>
        <div class="recovery-indicator pattern-{{COLOR}}"></div>
        <span class="last-updated">Updated: {{UPDATED}}</span>
      </div>

      <div class="panel__section">
        <h3>HRV Trend (7 Days)</h3>
        <svg class="hrv-trend" viewBox="0 0 300 150" preserveAspectRatio="none">
          <line class="hrv-trend-baseline" x1="0" y1="75" x2="300" y2="75"></line>
          {{HRV_CHART}}
        </svg>
        <p>Current: {{HRV_CURRENT}} ms</p>
      </div>

      <div class="panel__section">
        <h3>Resting Heart Rate</h3>
        <p class="heart-rate">{{RHR}}</p>
        <p>BPM</p>
      </div>

      <div class="panel__section">
        <h3>Sleep Performance</h3>
        <p>{{SLEEP_HOURS}} of {{SLEEP_NEEDED}}</p>
        <div class="sleep-progress">
          <div class="sleep-progress-bar" style="width: {{SLEEP_PERCENT}}%;"></div>
        </div>
        <p>{{SLEEP_DEFICIT}}</p>
      </div>
    </div>

    {{TITLE_BAR}}
  </div>
</body>
</html>"#;

const AUTH_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>WHOOP Authentication</title>
  <style>
{{BASE_CSS}}
    body {
      display: flex;
      flex-direction: column;
    }

    h1 {
      font-size: 32px;
      margin-bottom: 20px;
    }

    p {
      font-size: 18px;
      line-height: 1.5;
      margin-bottom: 30px;
      max-width: 600px;
    }

    .qr-placeholder {
      width: 200px;
      height: 200px;
      border: 1px solid #000;
      margin: 20px auto;
      display: flex;
      align-items: center;
      justify-content: center;
      font-size: 14px;
      word-break: break-all;
    }

    .auth-link {
      display: block;
      margin-top: 20px;
      font-size: 16px;
      word-break: break-all;
      max-width: 600px;
    }
  </style>
</head>
<body>
  <div class="content">
    <h1>WHOOP Authentication Required</h1>

    <p>To display your WHOOP recovery data, this dashboard needs to connect to your WHOOP account. Scan the code below or visit the URL on your phone or computer to authorize access.</p>

    <div class="qr-placeholder">
      Visit: {{AUTH_URL}}
    </div>

    <p>Once authorized, your WHOOP recovery data will automatically appear on this display.</p>

    <div class="auth-link">
      {{AUTH_URL}}
    </div>
  </div>

  {{TITLE_BAR}}
</body>
</html>"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Error - WHOOP Recovery Dashboard</title>
  <style>
{{BASE_CSS}}
    body {
      display: flex;
      flex-direction: column;
    }

    h1 {
      font-size: 32px;
      margin-bottom: 20px;
    }

    .error-icon {
      font-size: 64px;
      margin-bottom: 20px;
    }

    .error-message {
      font-size: 20px;
      margin-bottom: 30px;
      max-width: 600px;
    }

    .error-details {
      font-size: 16px;
      margin-top: 20px;
      text-align: left;
      max-width: 600px;
      border: 1px solid #000;
      padding: 15px;
      white-space: pre-wrap;
      word-break: break-word;
    }

    .retry-info {
      margin-top: 30px;
      font-size: 18px;
    }
  </style>
</head>
<body>
  <div class="content">
    <div class="error-icon">!</div>
    <h1>Error</h1>

    <div class="error-message">{{MESSAGE}}</div>

    {{DETAIL}}

    <div class="retry-info">
      The dashboard will automatically retry in a few minutes.
      <br>
      Last attempt: {{ATTEMPT}}
    </div>
  </div>

  {{TITLE_BAR}}
</body>
</html>"#;

const HOME_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>WHOOP Recovery Dashboard</title>
  <style>
    body { font-family: sans-serif; max-width: 640px; margin: 40px auto; padding: 0 16px; color: #111; }
    a.button { display: inline-block; padding: 10px 18px; background: #111; color: #fff; text-decoration: none; border-radius: 6px; }
    code { background: #eee; padding: 2px 4px; }
  </style>
</head>
<body>
  <h1>WHOOP Recovery Dashboard</h1>
  <p>Shows your WHOOP recovery score, HRV trend, resting heart rate and sleep on a TRMNL e-ink display.</p>
  <p><a class="button" href="{{AUTH_PATH}}">Connect WHOOP</a></p>
  <h2>Setup</h2>
  <ol>
    <li>Connect your WHOOP account with the button above.</li>
    <li>Point a TRMNL private plugin (polling strategy) at <code>/api/dashboard</code>.</li>
  </ol>
</body>
</html>"#;

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Authentication Successful</title>
  <style>
    body { font-family: sans-serif; max-width: 640px; margin: 40px auto; padding: 0 16px; color: #111; }
    .notice { border: 1px solid #2a7; background: #efe; padding: 16px; border-radius: 6px; }
  </style>
</head>
<body>
  <h1>Authentication Successful!</h1>
  <div class="notice">
    <p>Your WHOOP account is now connected to your TRMNL device.</p>
    <p>The display will show your recovery data on its next refresh.</p>
  </div>
  <p>You can close this window.</p>
  <p><a href="/">Return to Home</a></p>
</body>
</html>"#;
