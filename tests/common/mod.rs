use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use taller_api::db::{self, DbConfig, DbPool};
use taller_api::domain::{Actor, Area};
use taller_api::entities::order;
use taller_api::events::{process_events, EventSender, RealtimeBroadcaster};
use taller_api::handlers::AppServices;
use taller_api::services::notifications::StaticUserDirectory;
use taller_api::services::orders::CreateOrderRequest;

/// Helper harness wiring the full service stack over an in-memory SQLite
/// database. One connection only: a second connection would see a
/// different empty database.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout: Duration::from_secs(3600),
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let db = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let broadcaster = RealtimeBroadcaster::new(64);
        tokio::spawn(process_events(event_rx, broadcaster));

        let directory = Arc::new(StaticUserDirectory::new(vec![
            (Self::admin().id, Area::Admin),
            (Self::operaciones().id, Area::Operaciones),
            (Self::envios().id, Area::Envios),
            (Self::corte().id, Area::Corte),
            (Self::bordado().id, Area::Bordado),
            (Self::ensamble().id, Area::Ensamble),
            (Self::plancha().id, Area::Plancha),
        ]));

        let services = AppServices::new(db.clone(), Arc::new(event_sender), directory);

        Self { db, services }
    }

    pub fn admin() -> Actor {
        Actor::new(1, Area::Admin)
    }

    pub fn operaciones() -> Actor {
        Actor::new(2, Area::Operaciones)
    }

    pub fn envios() -> Actor {
        Actor::new(3, Area::Envios)
    }

    pub fn corte() -> Actor {
        Actor::new(10, Area::Corte)
    }

    pub fn bordado() -> Actor {
        Actor::new(20, Area::Bordado)
    }

    pub fn ensamble() -> Actor {
        Actor::new(30, Area::Ensamble)
    }

    pub fn plancha() -> Actor {
        Actor::new(40, Area::Plancha)
    }

    /// Registers an order with all pieces in the intake area (corte).
    pub async fn seed_order(&self, folio: &str, total_piezas: i32) -> order::Model {
        self.services
            .orders
            .create_order(
                Self::corte(),
                CreateOrderRequest {
                    folio: folio.to_string(),
                    cliente_hotel: "Hotel Riviera".to_string(),
                    no_solicitud: "SOL-100".to_string(),
                    no_hoja: None,
                    modelo: "M-210".to_string(),
                    tipo_prenda: "Camisa".to_string(),
                    color: "Blanco".to_string(),
                    tela: "Algodón".to_string(),
                    total_piezas,
                },
            )
            .await
            .expect("failed to seed order")
    }

    /// Current ledger as an area -> pieces map.
    pub async fn ledger_map(&self, order_id: Uuid) -> BTreeMap<String, i32> {
        let pieces = self
            .services
            .orders
            .order_pieces(order_id)
            .await
            .expect("failed to read ledger");
        pieces
            .distribution
            .into_iter()
            .map(|row| (row.area.to_string(), row.pieces))
            .collect()
    }

    /// Sum of all ledger rows for an order.
    pub async fn ledger_total(&self, order_id: Uuid) -> i32 {
        self.ledger_map(order_id).await.values().sum()
    }
}
