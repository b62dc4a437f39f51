mod common;

use assert_matches::assert_matches;
use taller_api::domain::Area;
use taller_api::entities::order::OrderStatus;
use taller_api::entities::order_history::OrderAction;
use taller_api::entities::transfer::TransferStatus;
use taller_api::errors::ServiceError;
use taller_api::services::transfers::RequestTransferRequest;

use common::TestApp;

fn transfer_request(
    order_id: uuid::Uuid,
    to_area: Area,
    pieces: i32,
) -> RequestTransferRequest {
    RequestTransferRequest {
        order_id,
        to_area,
        pieces,
        notes: None,
    }
}

#[tokio::test]
async fn partial_transfer_then_consolidation_updates_current_area() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1001", 100).await;

    assert_eq!(order.current_area, Area::Corte);
    assert_eq!(app.ledger_total(order.id).await, 100);

    // move 40 of 100 to bordado
    let t1 = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Bordado, 40),
        )
        .await
        .unwrap();
    assert_eq!(t1.status, TransferStatus::Pending);

    let t1 = app
        .services
        .transfers
        .accept(TestApp::bordado(), t1.id)
        .await
        .unwrap();
    assert_eq!(t1.status, TransferStatus::Accepted);
    assert_eq!(t1.processed_by, Some(TestApp::bordado().id));

    let ledger = app.ledger_map(order.id).await;
    assert_eq!(ledger.get("corte"), Some(&60));
    assert_eq!(ledger.get("bordado"), Some(&40));
    assert_eq!(app.ledger_total(order.id).await, 100);

    // split order: current_area untouched, residency is None
    let order_now = app
        .services
        .orders
        .get_order(order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order_now.current_area, Area::Corte);
    let pieces = app.services.orders.order_pieces(order.id).await.unwrap();
    assert_eq!(pieces.resident_area, None);

    // move the remaining 60: everything consolidates in bordado
    let t2 = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Bordado, 60),
        )
        .await
        .unwrap();
    app.services
        .transfers
        .accept(TestApp::bordado(), t2.id)
        .await
        .unwrap();

    let ledger = app.ledger_map(order.id).await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.get("bordado"), Some(&100));

    let order_now = app
        .services
        .orders
        .get_order(order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order_now.current_area, Area::Bordado);
    let pieces = app.services.orders.order_pieces(order.id).await.unwrap();
    assert_eq!(pieces.resident_area, Some(Area::Bordado));
}

#[tokio::test]
async fn conflicting_accepts_cannot_overdraw_the_source_area() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1002", 100).await;

    // both requests pass the live check while the balance is still 100
    let t1 = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Bordado, 60),
        )
        .await
        .unwrap();
    let t2 = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Plancha, 60),
        )
        .await
        .unwrap();

    app.services
        .transfers
        .accept(TestApp::bordado(), t1.id)
        .await
        .unwrap();

    // the second accept re-reads the live balance (40) and must lose
    let err = app
        .services
        .transfers
        .accept(TestApp::plancha(), t2.id)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientBalance {
            requested: 60,
            available: 40
        }
    );

    let ledger = app.ledger_map(order.id).await;
    assert_eq!(ledger.get("corte"), Some(&40));
    assert_eq!(ledger.get("bordado"), Some(&60));
    assert_eq!(app.ledger_total(order.id).await, 100);
}

#[tokio::test]
async fn transfers_resolve_exactly_once() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1003", 50).await;

    let transfer = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Bordado, 20),
        )
        .await
        .unwrap();

    app.services
        .transfers
        .accept(TestApp::bordado(), transfer.id)
        .await
        .unwrap();

    let err = app
        .services
        .transfers
        .accept(TestApp::bordado(), transfer.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));

    let err = app
        .services
        .transfers
        .reject(TestApp::bordado(), transfer.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));

    // the double resolution attempts changed nothing
    let ledger = app.ledger_map(order.id).await;
    assert_eq!(ledger.get("corte"), Some(&30));
    assert_eq!(ledger.get("bordado"), Some(&20));
}

#[tokio::test]
async fn rejection_leaves_the_ledger_alone() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1004", 80).await;

    let transfer = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Plancha, 30),
        )
        .await
        .unwrap();

    let rejected = app
        .services
        .transfers
        .reject(TestApp::plancha(), transfer.id)
        .await
        .unwrap();
    assert_eq!(rejected.status, TransferStatus::Rejected);

    let ledger = app.ledger_map(order.id).await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.get("corte"), Some(&80));

    let history = app.services.orders.order_history(order.id).await.unwrap();
    let actions: Vec<_> = history.iter().map(|h| h.action).collect();
    assert!(actions.contains(&OrderAction::TransferRejected));
    assert!(!actions.contains(&OrderAction::TransferAccepted));
}

#[tokio::test]
async fn request_exceeding_live_balance_reports_both_counts() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1005", 100).await;

    let err = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Bordado, 150),
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientBalance {
            requested: 150,
            available: 100
        }
    );

    // an area holding nothing reports zero available
    let err = app
        .services
        .transfers
        .request_transfer(
            TestApp::bordado(),
            transfer_request(order.id, Area::Plancha, 1),
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientBalance {
            requested: 1,
            available: 0
        }
    );
}

#[tokio::test]
async fn only_the_destination_area_resolves_a_transfer() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1006", 60).await;

    let transfer = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Bordado, 10),
        )
        .await
        .unwrap();

    let err = app
        .services
        .transfers
        .accept(TestApp::plancha(), transfer.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    // admin may step in for any destination
    app.services
        .transfers
        .accept(TestApp::admin(), transfer.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_folio_is_rejected() {
    let app = TestApp::new().await;
    app.seed_order("F-1007", 10).await;

    let err = app
        .services
        .orders
        .create_order(
            TestApp::corte(),
            taller_api::services::orders::CreateOrderRequest {
                folio: "F-1007".to_string(),
                cliente_hotel: "Hotel Riviera".to_string(),
                no_solicitud: "SOL-101".to_string(),
                no_hoja: None,
                modelo: "M-211".to_string(),
                tipo_prenda: "Pantalón".to_string(),
                color: "Negro".to_string(),
                tela: "Lino".to_string(),
                total_piezas: 5,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn completion_is_shipping_only_and_errors_when_repeated() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1008", 10).await;

    let err = app
        .services
        .orders
        .complete_order(TestApp::corte(), order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    let completed = app
        .services
        .orders
        .complete_order(TestApp::envios(), order.id)
        .await
        .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert!(completed.completed_at.is_some());

    let err = app
        .services
        .orders
        .complete_order(TestApp::envios(), order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));
}

#[tokio::test]
async fn hard_delete_cascades_to_every_dependent_row() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1009", 40).await;

    let transfer = app
        .services
        .transfers
        .request_transfer(
            TestApp::corte(),
            transfer_request(order.id, Area::Bordado, 15),
        )
        .await
        .unwrap();
    app.services
        .transfers
        .accept(TestApp::bordado(), transfer.id)
        .await
        .unwrap();

    let err = app
        .services
        .orders
        .delete_order(TestApp::corte(), order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    app.services
        .orders
        .delete_order(TestApp::admin(), order.id)
        .await
        .unwrap();

    assert!(app
        .services
        .orders
        .get_order(order.id)
        .await
        .unwrap()
        .is_none());
    let err = app
        .services
        .orders
        .order_pieces(order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
    assert!(app
        .services
        .orders
        .order_history(order.id)
        .await
        .unwrap()
        .is_empty());

    // the requester's inbox no longer references the deleted order
    let inbox = app
        .services
        .notifications
        .list_for_user(TestApp::corte().id)
        .await
        .unwrap();
    assert!(inbox.iter().all(|n| n.order_id != Some(order.id)));
}

#[tokio::test]
async fn conservation_holds_across_a_long_transfer_chain() {
    let app = TestApp::new().await;
    let order = app.seed_order("F-1010", 100).await;

    let hops = [
        (TestApp::corte(), Area::Bordado, TestApp::bordado(), 25),
        (TestApp::corte(), Area::Ensamble, TestApp::ensamble(), 75),
        (TestApp::bordado(), Area::Ensamble, TestApp::ensamble(), 25),
        (TestApp::ensamble(), Area::Plancha, TestApp::plancha(), 90),
        (TestApp::ensamble(), Area::Plancha, TestApp::plancha(), 10),
    ];

    for (from, to_area, to_actor, pieces) in hops {
        let transfer = app
            .services
            .transfers
            .request_transfer(from, transfer_request(order.id, to_area, pieces))
            .await
            .unwrap();
        app.services
            .transfers
            .accept(to_actor, transfer.id)
            .await
            .unwrap();

        assert_eq!(app.ledger_total(order.id).await, 100);
    }

    let ledger = app.ledger_map(order.id).await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.get("plancha"), Some(&100));

    let order_now = app
        .services
        .orders
        .get_order(order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order_now.current_area, Area::Plancha);
}
