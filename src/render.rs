//! Plain-text rendering of the session for the terminal.

use std::fmt::Write;

use meteo_search::SearchSession;
use meteo_weather::LocationCandidate;

const FAVORITE_MARK: char = '★';
const NOT_FAVORITE_MARK: char = '☆';

/// Weather card, coordinates and forecast table. Empty if nothing was found yet.
/// The star is filled when the displayed city is a favorite.
pub fn session(session: &SearchSession, is_favorite: bool) -> String {
    let mut out = String::new();
    let Some(current) = &session.current else {
        return out;
    };

    let mark = if is_favorite {
        FAVORITE_MARK
    } else {
        NOT_FAVORITE_MARK
    };
    if current.country.is_empty() {
        let _ = writeln!(out, "{} {}", mark, current.city);
    } else {
        let _ = writeln!(out, "{} {}, {}", mark, current.city, current.country);
    }
    let _ = writeln!(
        out,
        "  {}  {:.1}°C (feels like {:.1}°C)  humidity {}%",
        current.condition_label, current.temperature_c, current.feels_like_c, current.humidity_pct
    );
    if let Some(url) = current.icon_url() {
        let _ = writeln!(out, "  icon: {}", url);
    }
    if let Some(coordinates) = session.coordinates {
        let _ = writeln!(out, "  coordinates: {}", coordinates);
    }

    let series = session.series();
    if !series.is_empty() {
        let _ = writeln!(out, "Forecast");
        let rows = series
            .temperature
            .iter()
            .zip(&series.humidity)
            .zip(&series.wind);
        for ((temperature, humidity), wind) in rows {
            let _ = writeln!(
                out,
                "  {:<10} {:>6.1}°C {:>4.0}% {:>5.1} m/s",
                temperature.label, temperature.value, humidity.value, wind.value
            );
        }
    }
    out
}

/// Numbered list, 1-based so it matches the `:N` command.
pub fn suggestions(candidates: &[LocationCandidate]) -> String {
    let mut out = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({})",
            i + 1,
            candidate.label(),
            candidate.coordinates()
        );
    }
    out
}

pub fn favorites(cities: &[String]) -> String {
    if cities.is_empty() {
        return "No favorite cities yet\n".to_string();
    }
    let mut out = String::new();
    for (i, city) in cities.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, city);
    }
    out
}
