/// Test fixtures: representative JSON payloads from the OpenWeatherMap
/// 5 day / 3 hour forecast API and the Nominatim search API.
///
/// Forecast response shape:
///   cod, message, cnt
///   list[]
///     .dt            - unix seconds, UTC
///     .main.temp     - °C with units=metric
///     .main.humidity - %, integer
///     .main.pressure - hPa, integer
///     .wind.speed    - m/s
///     .rain.3h       - mm over the bucket; the whole `rain` object is
///                      omitted when no rain is forecast
///     .dt_txt        - "YYYY-MM-DD HH:MM:SS", UTC
///   city{}
///
/// Trimmed to the fields the parser reads plus enough surrounding noise to
/// make sure unknown fields are ignored.

/// Three buckets starting 2024-05-01 12:00 UTC. The second has no `rain`
/// object at all, the third has `rain` without the `3h` key.
pub(crate) fn fixture_forecast_json() -> &'static str {
    r#"{
      "cod": "200",
      "message": 0,
      "cnt": 3,
      "list": [
        {
          "dt": 1714564800,
          "main": { "temp": 24.3, "feels_like": 24.6, "pressure": 1012, "humidity": 78 },
          "weather": [{ "id": 500, "main": "Rain", "description": "chuva leve" }],
          "wind": { "speed": 3.2, "deg": 140, "gust": 5.1 },
          "rain": { "3h": 1.25 },
          "dt_txt": "2024-05-01 12:00:00"
        },
        {
          "dt": 1714575600,
          "main": { "temp": 26.1, "feels_like": 26.4, "pressure": 1010, "humidity": 65 },
          "weather": [{ "id": 803, "main": "Clouds", "description": "nublado" }],
          "wind": { "speed": 4.0, "deg": 150 },
          "dt_txt": "2024-05-01 15:00:00"
        },
        {
          "dt": 1714586400,
          "main": { "temp": 22.8, "feels_like": 23.0, "pressure": 1011, "humidity": 82 },
          "weather": [{ "id": 500, "main": "Rain", "description": "chuva leve" }],
          "wind": { "speed": 2.1, "deg": 160 },
          "rain": { "1h": 0.4 },
          "dt_txt": "2024-05-01 18:00:00"
        }
      ],
      "city": { "id": 3471872, "name": "Araraquara", "country": "BR", "timezone": -10800 }
    }"#
}

/// What the provider returns for an unknown city: valid JSON, no `list`.
pub(crate) fn fixture_city_not_found_json() -> &'static str {
    r#"{ "cod": "404", "message": "city not found" }"#
}

/// Two usable buckets around one entry missing its `main` block. Only the
/// broken entry should be dropped.
pub(crate) fn fixture_partially_malformed_json() -> &'static str {
    r#"{
      "cod": "200",
      "list": [
        {
          "dt": 1714564800,
          "main": { "temp": 24.0, "pressure": 1012, "humidity": 70 },
          "wind": { "speed": 3.0 },
          "rain": { "3h": 4.0 }
        },
        {
          "dt": 1714575600,
          "wind": { "speed": 3.0 },
          "rain": { "3h": 9.0 }
        },
        {
          "main": { "temp": 23.0, "pressure": 1011, "humidity": 75 },
          "wind": { "speed": 2.5 },
          "rain": { "3h": 2.5 },
          "dt_txt": "2024-05-01 18:00:00"
        }
      ]
    }"#
}

/// Nominatim search result for a street in Araraquara (limit=1).
pub(crate) fn fixture_nominatim_hit_json() -> &'static str {
    r#"[
      {
        "place_id": 12345678,
        "lat": "-21.7932150",
        "lon": "-48.1756473",
        "display_name": "Rua Maurício Galli, Vila Xavier, Araraquara, São Paulo, Brasil",
        "class": "highway",
        "type": "residential",
        "importance": 0.41
      }
    ]"#
}

pub(crate) fn fixture_nominatim_empty_json() -> &'static str {
    "[]"
}
