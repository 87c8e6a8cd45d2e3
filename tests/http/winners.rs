use async_race::{
    InMemoryBackend, SortField, SortOrder, WinnerLedger, WinnerRecord, WinnerUpdate, WinnersApi,
    WinnersQuery,
};

use crate::support::{connect, start_server};

fn seeded() -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    backend.seed_winner(WinnerRecord { id: 1, wins: 3, time: 4200.0 });
    backend.seed_winner(WinnerRecord { id: 2, wins: 1, time: 3100.0 });
    backend.seed_winner(WinnerRecord { id: 3, wins: 7, time: 5600.0 });
    backend
}

#[tokio::test]
async fn sorts_and_paginates() {
    let (client, _) = connect(seeded()).await;

    let by_wins = client
        .list_winners(WinnersQuery::new(1, 10).sorted(SortField::Wins, SortOrder::Desc))
        .await
        .unwrap();
    let ids: Vec<_> = by_wins.items.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(by_wins.total, 3);

    let by_time = client
        .list_winners(WinnersQuery::new(1, 2).sorted(SortField::Time, SortOrder::Asc))
        .await
        .unwrap();
    let ids: Vec<_> = by_time.items.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(by_time.total, 3);
    assert!(by_time.has_next());
}

#[tokio::test]
async fn sort_params_on_the_wire() {
    let base = start_server(seeded()).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/winners?_page=1&_limit=10&_sort=time&_order=DESC"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.headers()["X-Total-Count"], "3");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body[0]["id"], 3);
    assert_eq!(body[0]["time"], 5600.0);

    let resp = reqwest::Client::new()
        .get(format!("{base}/winners?_sort=speed"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn missing_winner_reads_as_none() {
    let (client, _) = connect(seeded()).await;

    assert_eq!(client.get_winner(40).await.unwrap(), None);
    assert_eq!(
        client.get_winner(2).await.unwrap(),
        Some(WinnerRecord { id: 2, wins: 1, time: 3100.0 })
    );
}

#[tokio::test]
async fn winner_writes() {
    let backend = InMemoryBackend::new();
    let (client, _) = connect(backend.clone()).await;

    let created = client
        .create_winner(&WinnerRecord { id: 5, wins: 1, time: 4000.0 })
        .await
        .unwrap();
    assert_eq!(created.id, 5);

    let updated = client
        .update_winner(5, &WinnerUpdate { wins: 2, time: 3500.0 })
        .await
        .unwrap();
    assert_eq!(updated, WinnerRecord { id: 5, wins: 2, time: 3500.0 });

    client.delete_winner(5).await.unwrap();
    assert!(backend.winners().is_empty());
    assert!(client.delete_winner(5).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn ledger_accumulates_over_http() {
    let backend = InMemoryBackend::new();
    let (client, _) = connect(backend.clone()).await;
    let ledger = WinnerLedger::new(client);

    ledger.record_win(9, std::time::Duration::from_millis(4000)).await.unwrap();
    let record = ledger.record_win(9, std::time::Duration::from_millis(3500)).await.unwrap();

    assert_eq!(record, WinnerRecord { id: 9, wins: 2, time: 3500.0 });
    assert_eq!(backend.winner(9), Some(record));
}
