use crate::models::{
    AccountSummary, BalanceResponse, ChartData, FlightView, StatsResponse, TravellerChartsResponse,
};
use crate::views::{View, ViewState};

/// Data behind the active view.
pub enum ViewContent {
    Account {
        charts: TravellerChartsResponse,
        balance: BalanceResponse,
    },
    Statistics(StatsResponse),
    History(Vec<FlightView>),
    Planning(ChartData),
}

pub fn render_index(
    state: &ViewState,
    account: &AccountSummary,
    content: &ViewContent,
) -> String {
    let balance_class = if account.in_credit { "value good" } else { "value bad" };
    let status_class = match account.status.as_str() {
        "GROUNDED" => "badge bad",
        "MID-TRIP" => "badge neutral",
        _ => "badge good",
    };
    INDEX_HTML
        .replace("{{NAV}}", &render_nav(state))
        .replace("{{STATUS_CLASS}}", status_class)
        .replace("{{STATUS}}", &account.status)
        .replace("{{BALANCE_CLASS}}", balance_class)
        .replace("{{BALANCE}}", &format!("{} km", account.balance))
        .replace("{{CLEARANCE}}", account.clearance_date.as_deref().unwrap_or("--"))
        .replace("{{CONTENT}}", &render_content(content))
}

fn render_nav(state: &ViewState) -> String {
    View::ALL
        .into_iter()
        .map(|view| {
            let next = state.activate(view);
            let class = if view == state.active { "tab active" } else { "tab" };
            format!(r#"<a class="{class}" href="/?{}">{}</a>"#, next.query(), view.title())
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn render_content(content: &ViewContent) -> String {
    match content {
        ViewContent::Account { charts, balance } => [
            render_chart_table("Distance per month (km, 3-month average)", &charts.distance),
            render_chart_table("CO2 per month (tonnes)", &charts.footprint),
            render_chart_table("Balance by day (km)", &balance.chart),
        ]
        .concat(),
        ViewContent::Statistics(stats) => [
            render_chart_table("Flights per month", &stats.monthly_flights),
            render_chart_table("Distance per day (km)", &stats.daily),
        ]
        .concat(),
        ViewContent::History(flights) => render_flights(flights),
        ViewContent::Planning(destinations) => {
            render_chart_table("Top destinations", destinations)
        }
    }
}

/// One row per label, one column per dataset. Gaps render as `--`.
pub fn render_chart_table(title: &str, chart: &ChartData) -> String {
    if chart.labels.is_empty() {
        return format!(
            r#"<section class="chart-card"><h2>{}</h2><p class="hint">No data yet</p></section>"#,
            escape(title)
        );
    }

    let header: String = chart
        .datasets
        .iter()
        .map(|dataset| format!("<th>{}</th>", escape(&dataset.label)))
        .collect();
    let rows: String = chart
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let cells: String = chart
                .datasets
                .iter()
                .map(|dataset| dataset.data.get(i).copied().flatten())
                .map(|value| format!("<td>{}</td>", format_value(value)))
                .collect();
            format!("<tr><td>{}</td>{cells}</tr>", escape(label))
        })
        .collect();

    format!(
        concat!(
            r#"<section class="chart-card"><h2>{}</h2><table>"#,
            "<thead><tr><th></th>{header}</tr></thead>",
            "<tbody>{rows}</tbody></table></section>",
        ),
        escape(title),
        header = header,
        rows = rows,
    )
}

fn render_flights(flights: &[FlightView]) -> String {
    if flights.is_empty() {
        return concat!(
            r#"<section class="chart-card"><h2>Flights</h2>"#,
            r#"<p class="hint">No flights yet</p></section>"#,
        )
        .to_string();
    }
    let rows: String = flights
        .iter()
        .map(|flight| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&flight.start),
                escape(&flight.from),
                escape(&flight.to),
                format_value(Some(flight.distance)),
                escape(&flight.trip_status)
            )
        })
        .collect();
    format!(
        concat!(
            r#"<section class="chart-card"><h2>Flights</h2><table><thead><tr>"#,
            "<th>Start</th><th>From</th><th>To</th><th>Distance (km)</th><th>Trip</th>",
            "</tr></thead><tbody>{rows}</tbody></table></section>",
        ),
        rows = rows,
    )
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(value) if value.fract() == 0.0 => format!("{value:.0}"),
        Some(value) => format!("{value:.2}"),
        None => "--".to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Flap Your Arms</title>
  <style>
    :root {
      --bg-1: #f4f7fb;
      --ink: #2b2a28;
      --good: #2d7a4b;
      --bad: #c63b2b;
      --neutral: #6b645d;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg-1);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      margin: 0;
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: var(--neutral);
      text-decoration: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .good {
      color: var(--good);
    }

    .bad {
      color: var(--bad);
    }

    .neutral {
      color: var(--neutral);
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      overflow-x: auto;
    }

    table {
      border-collapse: collapse;
      width: 100%;
      font-size: 0.9rem;
    }

    th, td {
      padding: 4px 8px;
      text-align: right;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    .hint {
      margin: 0;
      color: #6f6a65;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Flap Your Arms</h1>
    </header>
    <nav class="tabs">
        {{NAV}}
    </nav>
    <section class="panel">
      <div class="stat">
        <span class="label">Status</span>
        <span id="grounded" class="{{STATUS_CLASS}} value">{{STATUS}}</span>
      </div>
      <div class="stat">
        <span class="label">Balance</span>
        <span id="balance" class="{{BALANCE_CLASS}}">{{BALANCE}}</span>
      </div>
      <div class="stat">
        <span class="label">Clearance date</span>
        <span id="clearancedate" class="value">{{CLEARANCE}}</span>
      </div>
    </section>
    {{CONTENT}}
  </main>
</body>
</html>
"#;
