use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement, TransactionTrait};

use contracts::domain::a002_service_orders::MONTHS;

const ARTICLES: [(&str, &str); 12] = [
    ("POMPA", "Pompa di calore 12kW"),
    ("VALV", "Valvola a sfera ottone 1/2"),
    ("FILT", "Filtro aria G4 pannello"),
    ("COMP", "Compressore scroll R410"),
    ("TERM", "Termostato digitale ambiente"),
    ("CAVO", "Cavo elettrico FG16 3x2.5"),
    ("GUAR", "Guarnizione porta frigo"),
    ("VENT", "Ventilatore assiale 350mm"),
    ("SENS", "Sensore temperatura NTC"),
    ("RELE", "Rele termico 10A"),
    ("TUBO", "Tubo rame 3/8 ricotto"),
    ("LAMP", "Lampada LED vetrina"),
];

const TECHNICIANS: [&str; 5] = ["ROSSI", "BIANCHI", "VERDI", "ESPOSITO", "COLOMBO"];
const CUSTOMERS: [&str; 4] = ["CARREFOUR", "CONAD", "ESSELUNGA", "COOP"];
const CITIES: [&str; 5] = ["TORINO", "MILANO", "GENOVA", "BOLOGNA", "ROMA"];
const STATES: [&str; 3] = ["APERTO", "IN CORSO", "CHIUSO"];

async fn row_count(conn: &DatabaseConnection, table: &str) -> anyhow::Result<i64> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT COUNT(*) AS cnt FROM {}", table),
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("No count returned for {}", table))?;
    Ok(row.try_get::<i64>("", "cnt")?)
}

/// Inserts sample rows into grid tables that are still empty.
pub async fn seed_demo_data(conn: &DatabaseConnection) -> anyhow::Result<()> {
    if row_count(conn, "a001_materials").await? == 0 {
        let inserted = seed_materials(conn).await?;
        tracing::info!("Seeded {} demo materials", inserted);
    }
    if row_count(conn, "a002_service_orders").await? == 0 {
        let inserted = seed_service_orders(conn).await?;
        tracing::info!("Seeded {} demo service orders", inserted);
    }
    Ok(())
}

async fn seed_materials(conn: &DatabaseConnection) -> anyhow::Result<usize> {
    let txn = conn.begin().await?;
    let mut inserted = 0;

    for (year_idx, year) in [2023, 2024, 2025].into_iter().enumerate() {
        for (idx, (prefix, description)) in ARTICLES.iter().enumerate() {
            let n = year_idx * ARTICLES.len() + idx;
            // every fourth article has stock only in some warehouses
            let stock = |warehouse: usize| -> f64 {
                if (n + warehouse) % 4 == 0 {
                    0.0
                } else {
                    ((n * 7 + warehouse * 3) % 40) as f64 + 0.5 * (warehouse % 2) as f64
                }
            };
            txn.execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT INTO a001_materials
                    (id, codice, codicenet, descrizione, data_acquisto,
                     giacenza_torino, giacenza_milano, giacenza_genova, giacenza_bologna, giacenza_roma,
                     importo, sconto)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                [
                    format!("MAT-{:05}", n + 1).into(),
                    format!("{}-{:03}", prefix, n + 1).into(),
                    format!("N{:06}", 100_000 + n * 37).into(),
                    description.to_string().into(),
                    format!("{}-{:02}-15", year, idx % 12 + 1).into(),
                    stock(0).into(),
                    stock(1).into(),
                    stock(2).into(),
                    stock(3).into(),
                    if n % 9 == 0 { (-2.0f64).into() } else { stock(4).into() },
                    (25.0 + (n * 13 % 400) as f64).into(),
                    ((n % 4) as f64 * 5.0).into(),
                ],
            ))
            .await?;
            inserted += 1;
        }
    }

    txn.commit().await?;
    Ok(inserted)
}

async fn seed_service_orders(conn: &DatabaseConnection) -> anyhow::Result<usize> {
    let txn = conn.begin().await?;
    let mut inserted = 0;

    for (month_idx, month) in MONTHS.iter().enumerate() {
        for i in 0..10usize {
            let n = month_idx * 10 + i;
            let city = CITIES[n % CITIES.len()];
            txn.execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT INTO a002_service_orders
                    (MesePresentazione, RTC, NumeroOrdine, Cliente, PuntoVendita, Citta,
                     DataIntervento, Descrizione, Importo, Stato, Note, DataInserimento)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                [
                    month.to_string().into(),
                    TECHNICIANS[n % TECHNICIANS.len()].into(),
                    format!("OS-2024-{:04}", n + 1).into(),
                    CUSTOMERS[n % CUSTOMERS.len()].into(),
                    format!("PV {} {}", city, n % 7 + 1).into(),
                    city.into(),
                    format!("2024-{:02}-{:02}", month_idx + 1, i * 2 + 1).into(),
                    format!("Intervento {}", ARTICLES[n % ARTICLES.len()].1.to_lowercase()).into(),
                    (80.0 + (n * 17 % 900) as f64).into(),
                    STATES[n % STATES.len()].into(),
                    String::new().into(),
                    format!("2024-{:02}-01", month_idx + 1).into(),
                ],
            ))
            .await?;
            inserted += 1;
        }
    }

    txn.commit().await?;
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;

    #[tokio::test]
    async fn test_seed_fills_empty_tables_once() {
        let conn = memory_connection().await;
        seed_demo_data(&conn).await.unwrap();
        assert_eq!(row_count(&conn, "a001_materials").await.unwrap(), 36);
        assert_eq!(row_count(&conn, "a002_service_orders").await.unwrap(), 120);

        seed_demo_data(&conn).await.unwrap();
        assert_eq!(row_count(&conn, "a002_service_orders").await.unwrap(), 120);
    }
}
