//! HTML rendering for the index page.
//!
//! The page is self-contained apart from Leaflet and the map tiles, which the
//! browser fetches directly. City data reaches the map script as JSON.

use serde::Serialize;

use rain_core::{ForecastResult, Location, RainingCity};

pub const FORECAST_ERROR_TEXT: &str = "Error fetching weather data";
pub const NO_RAIN_TEXT: &str = "No rain detected in other major cities right now.";

const LEAFLET_VERSION: &str = "1.9.4";

const STYLE: &str = r#"
    body { font-family: sans-serif; background-color: #f0f4f8; margin: 0; padding: 2rem; }
    main { display: grid; gap: 1.5rem; max-width: 960px; margin: 0 auto; }
    .card { background: white; padding: 2rem; border-radius: 15px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); text-align: center; }
    h1, h2 { color: #2c3e50; }
    .status { font-size: 1.5rem; margin: 20px 0; font-weight: bold; }
    .rainy { color: #3498db; }
    .dry { color: #f39c12; }
    .details { color: #7f8c8d; }
    .error { color: red; }
    .cities { list-style: none; padding: 0; }
    .cities li { padding: 0.4rem 0; border-bottom: 1px solid #ecf0f1; }
    .amount { color: #3498db; font-weight: bold; }
    #map { height: 480px; border-radius: 15px; }
"#;

const MAP_SCRIPT: &str = r#"
    const map = L.map('map').setView([HOME.latitude, HOME.longitude], 2);
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
        maxZoom: 18,
        attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);

    function label(text) {
        const el = document.createElement('span');
        el.textContent = text;
        return el;
    }

    L.marker([HOME.latitude, HOME.longitude]).addTo(map).bindPopup(label(HOME.name));
    RAINING.forEach(function (city) {
        L.circleMarker([city.latitude, city.longitude], { radius: 8, color: '#3498db' })
            .addTo(map)
            .bindPopup(label(city.name + ': ' + city.rain_amount.toFixed(1) + ' mm'));
    });

    fetch('/radar-timestamp')
        .then(function (res) { return res.ok ? res.json() : Promise.reject(res.status); })
        .then(function (frame) {
            L.tileLayer(RADAR_HOST + frame.path + '/256/{z}/{x}/{y}/2/1_1.png', {
                opacity: 0.6,
                zIndex: 10
            }).addTo(map);
        })
        .catch(function () {});
"#;

/// Render the index page. Radar tiles are requested from `radar_tile_host`.
pub fn render_index(
    home: &Location,
    forecast: &ForecastResult,
    raining: &[RainingCity],
    radar_tile_host: &str,
) -> String {
    let title = format!("{} Forecast", escape_html(&home.name));
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>🌧️ {title}</title>\n"));
    html.push_str(&format!(
        "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css\">\n"
    ));
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n<main>\n"));

    html.push_str(&format!("<section class=\"card\">\n<h1>{title}</h1>\n"));
    html.push_str(&forecast_section(forecast));
    html.push_str("</section>\n");

    html.push_str("<section class=\"card\">\n<h2>Raining elsewhere</h2>\n");
    html.push_str(&raining_section(raining));
    html.push_str("</section>\n");

    html.push_str("<div id=\"map\"></div>\n</main>\n");
    html.push_str(&format!(
        "<script src=\"https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js\"></script>\n"
    ));
    html.push_str("<script>\n");
    html.push_str(&format!("    const HOME = {};\n", script_json(home)));
    html.push_str(&format!("    const RAINING = {};\n", script_json(&raining)));
    html.push_str(&format!("    const RADAR_HOST = {};\n", script_json(radar_tile_host)));
    html.push_str(MAP_SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");

    html
}

fn forecast_section(forecast: &ForecastResult) -> String {
    match forecast {
        ForecastResult::Error { error } => format!(
            "<p class=\"error\">{FORECAST_ERROR_TEXT}</p>\n<p class=\"details\"><small>{}</small></p>\n",
            escape_html(error)
        ),
        ForecastResult::Forecast { rain_sum, probability, will_rain } => {
            let (class, status) = if *will_rain {
                ("rainy", "🌧️ It might rain today!")
            } else {
                ("dry", "☀️ Likely no rain today.")
            };

            format!(
                "<div class=\"status {class}\">{status}</div>\n\
                 <div class=\"details\">\n\
                 <p>Precipitation Probability: {probability}%</p>\n\
                 <p>Expected Rain: {rain_sum:.1} mm</p>\n\
                 </div>\n"
            )
        }
    }
}

fn raining_section(raining: &[RainingCity]) -> String {
    if raining.is_empty() {
        return format!("<p class=\"no-rain\">{NO_RAIN_TEXT}</p>\n");
    }

    let items: String = raining
        .iter()
        .map(|city| {
            format!(
                "<li><span class=\"city\">{}</span> <span class=\"amount\">{:.1} mm</span></li>\n",
                escape_html(&city.location.name),
                city.rain_amount
            )
        })
        .collect();

    format!("<ul class=\"cities\">\n{items}</ul>\n")
}

/// JSON that is safe to embed inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json.replace('<', "\\u003c"),
        Err(err) => {
            tracing::error!("Failed to serialize page data: {err}");
            "null".to_string()
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
