use async_race::{ApiError, GarageApi, InMemoryBackend, NewCar};

use crate::support::{connect, start_server};

#[tokio::test]
async fn lists_cars_with_total_count() {
    let backend = InMemoryBackend::new();
    for i in 1..=9 {
        backend.seed_car(&format!("Car {i}"), "#aabbcc");
    }
    let (client, _) = connect(backend).await;

    let page = client.list_cars(2, 7).await.unwrap();

    assert_eq!(page.total, 9);
    assert_eq!(page.page, 2);
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Car 8", "Car 9"]);
    assert!(!page.has_next());
}

#[tokio::test]
async fn total_count_header_is_sent() {
    let backend = InMemoryBackend::new();
    backend.seed_car("Tesla", "#ffffff");
    backend.seed_car("Ford", "#000000");
    let base = start_server(backend).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/garage?_page=1&_limit=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["X-Total-Count"], "2");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Tesla");
}

#[tokio::test]
async fn car_lifecycle() {
    let (client, _) = connect(InMemoryBackend::new()).await;

    let car = client
        .create_car(&NewCar::new("Tesla Model S", "#ff0000"))
        .await
        .unwrap();
    assert_eq!(client.get_car(car.id).await.unwrap(), car);

    let updated = client
        .update_car(car.id, &NewCar::new("Tesla Model X", "#00ff00"))
        .await
        .unwrap();
    assert_eq!(updated.id, car.id);
    assert_eq!(updated.name, "Tesla Model X");

    client.delete_car(car.id).await.unwrap();
    let err = client.get_car(car.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn missing_car_is_not_found() {
    let (client, _) = connect(InMemoryBackend::new()).await;

    let err = client
        .update_car(42, &NewCar::new("Ghost", "#000000"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { id: 42, .. }));

    assert!(client.delete_car(42).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = async_race::HttpBackend::new(
        &async_race::Config::default().with_base_url(format!("http://{addr}")),
    )
    .unwrap();

    let err = client.list_cars(1, 7).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}
