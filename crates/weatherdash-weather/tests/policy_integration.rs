//! Integration tests for WeatherPolicy using wiremock as the upstream provider.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use weatherdash_core::{NetworkError, WeatherConfig};
use weatherdash_weather::{
    ConnectionStatus, TemperatureUnit, WeatherError, WeatherPolicy, WeatherReading,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to build an upstream `current.json` body
fn current_body(name: &str, region: &str, country: &str, temp_c: f64) -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": name,
            "region": region,
            "country": country,
            "lat": 51.52,
            "lon": -0.11
        },
        "current": {
            "temp_c": temp_c,
            "temp_f": temp_c * 9.0 / 5.0 + 32.0,
            "last_updated": "2024-01-15 14:30"
        }
    })
}

fn config_for(server: &MockServer) -> WeatherConfig {
    WeatherConfig {
        api_base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        request_timeout_secs: 1,
        default_unit: TemperatureUnit::Celsius,
    }
}

fn policy_for(server: &MockServer) -> WeatherPolicy {
    WeatherPolicy::from_config(&config_for(server)).unwrap()
}

async fn mount_location(server: &MockServer, q: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("q", q))
        .respond_with(template)
        .mount(server)
        .await;
}

fn cached_reading(location: &str) -> WeatherReading {
    WeatherReading {
        temperature: 11.0,
        temperature_unit: TemperatureUnit::Celsius,
        location: location.to_string(),
        last_update: "2024-01-15 10:00".to_string(),
        connection_status: ConnectionStatus::Online,
    }
}

#[tokio::test]
async fn test_fetch_success_populates_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/current.json"))
        .and(query_param("q", "London"))
        .and(query_param("key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body("London", "City of London, Greater London", "UK", 7.26)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let policy = policy_for(&server);
    assert!(!policy.has_cached_data());

    let reading = policy.fetch_weather_data("London").await.unwrap();

    assert_eq!(reading.temperature, 7.3);
    assert_eq!(reading.temperature_unit, TemperatureUnit::Celsius);
    assert_eq!(reading.location, "London, City of London, Greater London");
    assert_eq!(reading.last_update, "2024-01-15 14:30");
    assert_eq!(reading.connection_status, ConnectionStatus::Online);

    assert!(policy.has_cached_data());
    let cached = policy.cache().get().unwrap();
    assert_eq!(cached.reading, reading);
    assert!(Utc::now() - cached.cached_at < chrono::Duration::seconds(5));
}

#[tokio::test]
async fn test_successive_fetches_overwrite_cache() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "Paris",
        ResponseTemplate::new(200).set_body_json(current_body("Paris", "Ile-de-France", "France", 9.0)),
    )
    .await;
    mount_location(
        &server,
        "Oslo",
        ResponseTemplate::new(200).set_body_json(current_body("Oslo", "", "Norway", -4.0)),
    )
    .await;

    let policy = policy_for(&server);
    policy.fetch_weather_data("Paris").await.unwrap();
    policy.fetch_weather_data("Oslo").await.unwrap();

    let cached = policy.get_cached_weather_data().unwrap();
    assert_eq!(cached.location, "Oslo, Norway");
    assert_eq!(cached.temperature, -4.0);
    assert_eq!(cached.connection_status, ConnectionStatus::Offline);
}

#[tokio::test]
async fn test_server_error_without_cache_propagates() {
    let server = MockServer::start().await;
    mount_location(&server, "London", ResponseTemplate::new(500)).await;

    let policy = policy_for(&server);
    let err = policy.fetch_weather_data("London").await.unwrap_err();

    assert!(
        matches!(
            err,
            WeatherError::UpstreamRequestFailed(NetworkError::ServerError { status: 500, .. })
        ),
        "unexpected error: {:?}",
        err
    );
    assert!(!policy.has_cached_data());
}

#[tokio::test]
async fn test_provider_error_message_is_captured() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "Nowhere",
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })),
    )
    .await;

    let policy = policy_for(&server);
    let err = policy.fetch_weather_data("Nowhere").await.unwrap_err();

    match err {
        WeatherError::UpstreamRequestFailed(NetworkError::ServerError { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "No matching location found.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_out_of_range_without_cache_propagates() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "Hot",
        ResponseTemplate::new(200).set_body_json(current_body("Hot", "", "", 61.0)),
    )
    .await;
    mount_location(
        &server,
        "Cold",
        ResponseTemplate::new(200).set_body_json(current_body("Cold", "", "", -91.0)),
    )
    .await;

    let policy = policy_for(&server);

    let err = policy.fetch_weather_data("Hot").await.unwrap_err();
    assert!(matches!(err, WeatherError::TemperatureOutOfRange { celsius } if celsius == 61.0));

    let err = policy.fetch_weather_data("Cold").await.unwrap_err();
    assert!(matches!(err, WeatherError::TemperatureOutOfRange { celsius } if celsius == -91.0));

    assert!(!policy.has_cached_data());
}

#[tokio::test]
async fn test_failures_fall_back_to_fresh_cache() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "London",
        ResponseTemplate::new(200).set_body_json(current_body("London", "", "UK", 7.0)),
    )
    .await;
    mount_location(&server, "Down", ResponseTemplate::new(503)).await;
    mount_location(
        &server,
        "Hot",
        ResponseTemplate::new(200).set_body_json(current_body("Hot", "", "", 61.0)),
    )
    .await;
    mount_location(
        &server,
        "Cold",
        ResponseTemplate::new(200).set_body_json(current_body("Cold", "", "", -91.0)),
    )
    .await;

    let policy = policy_for(&server);
    policy.fetch_weather_data("London").await.unwrap();

    for failing in ["Down", "Hot", "Cold"] {
        let reading = policy.fetch_weather_data(failing).await.unwrap();
        assert_eq!(reading.location, "London, UK", "{} should fall back", failing);
        assert_eq!(reading.temperature, 7.0);
        assert_eq!(reading.connection_status, ConnectionStatus::Offline);
    }

    // Fallback reads never touch the slot
    let cached = policy.cache().get().unwrap();
    assert_eq!(cached.reading.location, "London, UK");
    assert_eq!(cached.reading.connection_status, ConnectionStatus::Online);
}

#[tokio::test]
async fn test_fallback_status_follows_cache_age() {
    let server = MockServer::start().await;
    mount_location(&server, "Down", ResponseTemplate::new(502)).await;

    let policy = policy_for(&server);
    let cases = [
        (chrono::Duration::minutes(30), ConnectionStatus::Offline),
        (chrono::Duration::hours(2), ConnectionStatus::Outdated),
        (chrono::Duration::hours(25), ConnectionStatus::Outdated),
    ];

    for (age, expected) in cases {
        policy
            .cache()
            .store_at(cached_reading("Berlin, Germany"), Utc::now() - age);

        let reading = policy.fetch_weather_data("Down").await.unwrap();
        assert_eq!(reading.connection_status, expected, "age {:?}", age);
        assert_eq!(reading.location, "Berlin, Germany");

        let direct = policy.get_cached_weather_data().unwrap();
        assert_eq!(direct.connection_status, expected);
    }
}

#[tokio::test]
async fn test_invalid_body_is_upstream_failure() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "London",
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let policy = policy_for(&server);
    let err = policy.fetch_weather_data("London").await.unwrap_err();

    assert!(matches!(
        err,
        WeatherError::UpstreamRequestFailed(NetworkError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "London",
        ResponseTemplate::new(200)
            .set_body_json(current_body("London", "", "UK", 7.0))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let policy = policy_for(&server);
    let err = policy.fetch_weather_data("London").await.unwrap_err();

    assert!(
        matches!(err, WeatherError::UpstreamRequestFailed(NetworkError::Timeout)),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_unreachable_upstream_falls_back() {
    let config = WeatherConfig {
        api_base_url: "http://127.0.0.1:1".to_string(),
        api_key: None,
        request_timeout_secs: 1,
        default_unit: TemperatureUnit::Celsius,
    };
    let policy = WeatherPolicy::from_config(&config).unwrap();

    let err = policy.fetch_weather_data("London").await.unwrap_err();
    assert!(matches!(err, WeatherError::UpstreamRequestFailed(_)));

    policy
        .cache()
        .store_at(cached_reading("London, UK"), Utc::now());
    let reading = policy.fetch_weather_data("London").await.unwrap();
    assert_eq!(reading.connection_status, ConnectionStatus::Offline);
}

#[tokio::test]
async fn test_get_weather_converts_requested_unit() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "Madrid",
        ResponseTemplate::new(200).set_body_json(current_body("Madrid", "Madrid", "Spain", 20.0)),
    )
    .await;

    let policy = policy_for(&server);

    let reading = policy
        .get_weather("Madrid", Some(TemperatureUnit::Fahrenheit))
        .await
        .unwrap();
    assert_eq!(reading.temperature, 68.0);
    assert_eq!(reading.temperature_unit, TemperatureUnit::Fahrenheit);

    // The slot keeps Celsius
    let cached = policy.cache().get().unwrap();
    assert_eq!(cached.reading.temperature, 20.0);
    assert_eq!(cached.reading.temperature_unit, TemperatureUnit::Celsius);

    let reading = policy.get_weather("Madrid", None).await.unwrap();
    assert_eq!(reading.temperature, 20.0);
    assert_eq!(reading.temperature_unit, TemperatureUnit::Celsius);
}

#[tokio::test]
async fn test_clear_cache() {
    let server = MockServer::start().await;
    mount_location(
        &server,
        "London",
        ResponseTemplate::new(200).set_body_json(current_body("London", "", "UK", 7.0)),
    )
    .await;

    let policy = policy_for(&server);
    policy.refresh_weather("London").await.unwrap();
    assert!(policy.has_cached_data());
    assert!(policy.cache_status().has_data);

    policy.clear_cache();

    assert!(!policy.has_cached_data());
    assert!(!policy.cache_status().has_data);
    assert!(matches!(
        policy.get_cached_weather_data(),
        Err(WeatherError::NoCachedDataAvailable)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fetches_leave_one_whole_entry() {
    let server = MockServer::start().await;
    let cities = ["Rome", "Vienna", "Prague", "Dublin"];
    for (i, city) in cities.iter().enumerate() {
        mount_location(
            &server,
            city,
            ResponseTemplate::new(200)
                .set_body_json(current_body(city, "", "EU", i as f64 * 10.0)),
        )
        .await;
    }

    let policy = Arc::new(policy_for(&server));
    let mut handles = Vec::new();
    for _ in 0..5 {
        for city in cities {
            let policy = policy.clone();
            handles.push(tokio::spawn(async move {
                policy.fetch_weather_data(city).await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let cached = policy.get_cached_weather_data().unwrap();
    let idx = cities
        .iter()
        .position(|c| cached.location == format!("{}, EU", c))
        .expect("cached location should be one of the fetched cities");
    assert_eq!(cached.temperature, idx as f64 * 10.0);
}
