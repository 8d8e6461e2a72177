use production_dashboard::{
    chart::{Trace, NO_DATA_TITLE},
    dashboard::{refresh, RefreshRequest},
    db::{self, LoadOutcome},
    settings::{DatabaseKind, DatabaseSettings},
};
use rusqlite::{params, Connection};
use std::path::Path;

fn create_production_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "create table producao (
            id integer primary key,
            ean text,
            sku text,
            descricao text,
            chassi text,
            montador text,
            data_inicio text,
            data_fim text,
            status text
        );",
    )
    .unwrap();
    let rows: &[(i64, &str, &str, &str, Option<&str>, &str)] = &[
        (1, "X1", "A", "2024-03-18 08:00:00", Some("2024-03-18 08:10:00"), "finalizado"),
        (2, "X2", "A", "2024-03-18 09:00:00", Some("2024-03-18 09:15:00"), "finalizado"),
        (3, "X1", "B", "2024-03-18 10:00:00", None, "em montagem"),
    ];
    for (id, sku, worker, start, end, status) in rows {
        conn.execute(
            "insert into producao values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                format!("789000000000{}", id),
                sku,
                "Bicicleta aro 29",
                format!("CH-{}", id),
                worker,
                start,
                end,
                status
            ],
        )
        .unwrap();
    }
}

fn settings(path: &Path) -> DatabaseSettings {
    DatabaseSettings {
        kind: DatabaseKind::Sqlite,
        path: Some(path.to_owned()),
        table: "producao".to_owned(),
        ..DatabaseSettings::default()
    }
}

fn bars(traces: &[Trace]) -> Vec<(&str, u64)> {
    traces
        .iter()
        .map(|t| match t {
            Trace::Bar { name, y, .. } => (name.as_str(), y[0]),
            Trace::Box { .. } => panic!("box trace in bar chart"),
        })
        .collect()
}

#[test_log::test]
fn scenario_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("producao.sqlite");
    create_production_db(&path);
    let mut source = db::open(&settings(&path)).unwrap();

    let view = refresh(&mut source, &RefreshRequest::all());
    assert_eq!(view.outcome, LoadOutcome::Rows(3));
    assert_eq!(bars(view.by_sku.traces()), vec![("X1", 2), ("X2", 1)]);
    assert_eq!(bars(view.by_worker.traces()), vec![("A", 2), ("B", 1)]);
    match view.durations.traces() {
        [Trace::Box { name, y, .. }] => {
            assert_eq!(name, "A");
            assert_eq!(y, &vec![15.0, 10.0]);
        }
        other => panic!("unexpected duration traces {:?}", other),
    }
    assert_eq!(view.worker_options, vec!["A".to_owned(), "B".to_owned()]);
    assert_eq!(view.table.as_ref().map(|t| t.rows.len()), Some(3));

    let view = refresh(&mut source, &RefreshRequest::for_worker("B"));
    assert_eq!(bars(view.by_sku.traces()), vec![("X1", 1)]);
    assert_eq!(bars(view.by_worker.traces()), vec![("B", 1)]);
    assert!(view.durations.traces().is_empty());
    assert_eq!(view.worker_options, vec!["A".to_owned(), "B".to_owned()]);
    assert_eq!(view.table.as_ref().map(|t| t.rows.len()), Some(1));
}

#[test_log::test]
fn every_refresh_reads_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("producao.sqlite");
    create_production_db(&path);
    let mut source = db::open(&settings(&path)).unwrap();

    let before = refresh(&mut source, &RefreshRequest::all());
    assert_eq!(before, refresh(&mut source, &RefreshRequest::all()));

    Connection::open(&path)
        .unwrap()
        .execute(
            "update producao set data_fim = '2024-03-18 10:30:00' where id = 3",
            [],
        )
        .unwrap();

    let after = refresh(&mut source, &RefreshRequest::for_worker("B"));
    match after.durations.traces() {
        [Trace::Box { name, y, .. }] => {
            assert_eq!(name, "B");
            assert_eq!(y, &vec![30.0]);
        }
        other => panic!("unexpected duration traces {:?}", other),
    }
}

#[test_log::test]
fn unreachable_database_shows_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = db::open(&settings(&dir.path().join("absent.sqlite"))).unwrap();

    let view = refresh(&mut source, &RefreshRequest::all());
    assert!(view.outcome.is_failure());
    for chart in [&view.by_sku, &view.by_worker, &view.durations] {
        assert_eq!(chart.title(), NO_DATA_TITLE);
        assert!(chart.traces().is_empty());
    }
    assert!(view.worker_options.is_empty());
    assert_eq!(view.table, None);
}

#[test]
fn sqlite_requires_a_path() {
    let settings = DatabaseSettings {
        kind: DatabaseKind::Sqlite,
        ..DatabaseSettings::default()
    };
    assert!(db::open(&settings).is_err());
}

#[test]
fn rejects_suspicious_table_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(&dir.path().join("x.sqlite"));
    settings.table = "producao; delete from producao".to_owned();
    assert!(db::open(&settings).is_err());
}
