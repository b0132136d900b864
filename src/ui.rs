use crate::audits::AuditRow;
use crate::profile::ProfileView;
use crate::radar;
use crate::ratio;
use std::fmt::Write;

pub const LOGIN_ERROR: &str = "Invalid username or password";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_login(error: Option<&str>) -> String {
    let (display, message) = match error {
        Some(message) => ("block", escape(message)),
        None => ("none", String::new()),
    };
    fill(
        LOGIN_HTML,
        &[
            ("STYLE", BASE_CSS),
            ("ERROR_DISPLAY", display),
            ("ERROR", &message),
        ],
    )
}

pub fn render_profile(view: &ProfileView) -> String {
    fill(
        PROFILE_HTML,
        &[
            ("STYLE", BASE_CSS),
            ("WELCOME", &escape(&view.welcome)),
            ("AVATAR", view.avatar.glyph()),
            ("XP", &escape(&view.xp_total)),
            ("RATIO", &escape(&view.audit_ratio)),
            ("WIDTH", &view.chart_width.to_string()),
            ("SKILLS_SVG", &radar::render_svg(&view.radar)),
            ("RATIO_SVG", &ratio::render_svg(&view.ratio)),
            ("PROJECTS", &render_projects(&view.recent_projects)),
            ("AUDITS", &render_audits(view.audits.as_deref())),
        ],
    )
}

/// Substitutes `{{KEY}}` placeholders in one pass over the template, so
/// substituted text is never scanned again. Unknown keys are left as written.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn render_projects(projects: &[String]) -> String {
    if projects.is_empty() {
        return "<div>No recent projects</div>".to_string();
    }
    let mut html = String::new();
    for (index, name) in projects.iter().enumerate() {
        let _ = write!(html, "<div>{}. {}</div>", index + 1, escape(name));
    }
    html
}

fn render_audits(rows: Option<&[AuditRow]>) -> String {
    let Some(rows) = rows else {
        return r#"<p class="hint">Audit history is unavailable right now.</p>"#.to_string();
    };
    if rows.is_empty() {
        return r#"<p class="hint">No audits yet.</p>"#.to_string();
    }

    let mut html = String::new();
    for row in rows {
        let date = row
            .audited_on
            .as_deref()
            .map(|on| format!(r#"<span class="audit-date">{on}</span>"#))
            .unwrap_or_default();
        let _ = write!(
            html,
            r#"<div class="audit-row"><div>{}{date}</div><div class="status-{}">{}</div></div>"#,
            escape(&row.title),
            row.status.as_str(),
            row.badge
        );
    }
    html
}

const BASE_CSS: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    h1, h2 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      margin: 0;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
    }

    .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    form {
      display: grid;
      gap: 12px;
    }

    input {
      border: 1px solid rgba(47, 72, 88, 0.2);
      border-radius: 12px;
      padding: 12px 14px;
      font: inherit;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
    }

    .error {
      color: #c63b2b;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    .grid-line {
      fill: none;
      stroke: rgba(47, 72, 88, 0.15);
    }

    .skill-polygon {
      fill: rgba(255, 107, 74, 0.25);
      stroke: var(--accent);
      stroke-width: 2;
    }

    .skill-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .done-bar {
      fill: var(--accent);
    }

    .received-bar {
      fill: var(--accent-2);
    }

    svg text {
      fill: #5f5c57;
      font-size: 12px;
    }

    .audit-row {
      display: flex;
      align-items: center;
      justify-content: space-between;
      margin-bottom: 10px;
      padding: 0 35px;
    }

    .audit-date {
      margin-left: 10px;
      color: #8b857d;
      font-size: 0.85rem;
    }

    .status-pass, .status-fail, .status-pending {
      border-radius: 999px;
      padding: 4px 12px;
      font-weight: 600;
      color: white;
    }

    .status-pass { background: #2d7a4b; }
    .status-fail { background: #c63b2b; }
    .status-pending { background: #8b857d; }

    .avatar {
      font-size: 2.4rem;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
    }
"#;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Sign in</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Sign in</h1>
      <p class="hint">Use your username or email and password.</p>
    </header>
    <form id="loginForm" class="card" method="post" action="/login">
      <input id="username" name="username" type="text" placeholder="Username or email" required />
      <input id="password" name="password" type="password" placeholder="Password" required />
      <button type="submit">Sign in</button>
      <div id="error" class="error" style="display: {{ERROR_DISPLAY}}">{{ERROR}}</div>
    </form>
  </main>
</body>
</html>
"#;

const PROFILE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Profile</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header id="user-info" class="panel">
      <h2>{{WELCOME}}</h2>
      <span class="avatar user-icon">{{AVATAR}}</span>
      <form method="post" action="/logout">
        <button id="logoutBtn" type="submit">Log out</button>
      </form>
    </header>

    <section class="panel">
      <div class="card">
        <span class="label">Total XP</span>
        <span id="xp-total" class="value">{{XP}}</span>
      </div>
      <div class="card">
        <span class="label">Audit ratio</span>
        <span id="ratio-value" class="value">{{RATIO}}</span>
      </div>
    </section>

    <section id="charts" class="card" data-width="{{WIDTH}}">
      <span class="label">Skills</span>
      <div id="skills-graph">{{SKILLS_SVG}}</div>
      <span class="label">Audits done / received</span>
      <div id="audit-ratio-graph">{{RATIO_SVG}}</div>
    </section>

    <section class="panel">
      <div class="card">
        <span class="label">Recent projects</span>
        <div id="ProjectRecents">{{PROJECTS}}</div>
      </div>
      <div class="card">
        <span class="label">Recent audits</span>
        <div id="currentOrDoneAudits">{{AUDITS}}</div>
      </div>
    </section>
  </main>

  <script>
    // Charts are laid out server-side for one width; reload at the measured one.
    const charts = document.getElementById('charts');
    const rendered = Number(charts.dataset.width);

    const syncWidth = () => {
      const measured = Math.round(document.getElementById('skills-graph').clientWidth);
      if (measured > 0 && Math.abs(measured - rendered) > 8) {
        const url = new URL(window.location.href);
        url.searchParams.set('width', String(measured));
        window.location.replace(url.toString());
      }
    };

    let resizeTimer = null;
    window.addEventListener('resize', () => {
      clearTimeout(resizeTimer);
      resizeTimer = setTimeout(syncWidth, 250);
    });
    syncWidth();
  </script>
</body>
</html>
"#;
