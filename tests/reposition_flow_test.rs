mod common;

use assert_matches::assert_matches;
use sea_orm::{ActiveModelTrait, Set};
use taller_api::domain::Area;
use taller_api::entities::reposition::{self, RepositionStatus, RepositionType, Urgency};
use taller_api::entities::reposition_history::RepositionAction;
use taller_api::entities::transfer::TransferStatus;
use taller_api::errors::ServiceError;
use taller_api::services::reposition_transfers::ProcessDecision;
use taller_api::services::repositions::{
    CreateRepositionRequest, RepositionPieceInput, ReviewDecision,
};

use common::TestApp;

fn reposition_request() -> CreateRepositionRequest {
    CreateRepositionRequest {
        r#type: RepositionType::Repocision,
        solicitante_nombre: "Marta Robles".to_string(),
        no_solicitud: "SOL-220".to_string(),
        no_hoja: Some("H-12".to_string()),
        causante_dano: "Bordadora 3".to_string(),
        descripcion_suceso: "Hilo reventado durante el bordado del logo".to_string(),
        modelo_prenda: "M-210".to_string(),
        tela: "Algodón".to_string(),
        color: "Blanco".to_string(),
        tipo_pieza: "Manga".to_string(),
        urgencia: Urgency::Urgente,
        observaciones: None,
        pieces: vec![RepositionPieceInput {
            talla: "M".to_string(),
            cantidad: 2,
            folio_original: Some("F-1001".to_string()),
        }],
    }
}

async fn force_status(app: &TestApp, reposition_id: uuid::Uuid, status: RepositionStatus) {
    let active = reposition::ActiveModel {
        id: Set(reposition_id),
        status: Set(status),
        ..Default::default()
    };
    active
        .update(&*app.db)
        .await
        .expect("failed to force status");
}

#[tokio::test]
async fn folio_sequence_is_month_scoped_and_zero_padded() {
    let app = TestApp::new().await;

    let first = app
        .services
        .repositions
        .create_reposition(TestApp::bordado(), reposition_request())
        .await
        .unwrap();
    let second = app
        .services
        .repositions
        .create_reposition(TestApp::bordado(), reposition_request())
        .await
        .unwrap();

    assert!(first.folio.starts_with("JN-REQ-"));
    assert!(first.folio.ends_with("-001"), "got {}", first.folio);
    assert!(second.folio.ends_with("-002"), "got {}", second.folio);
    assert_eq!(first.folio.len(), "JN-REQ-MM-YY-SSS".len());

    assert_eq!(first.status, RepositionStatus::Pendiente);
    assert_eq!(first.current_area, Area::Bordado);
    assert_eq!(first.solicitante_area, Area::Bordado);

    // admin and operaciones get pinged about the new request
    let admin_inbox = app
        .services
        .notifications
        .list_for_user(TestApp::admin().id)
        .await
        .unwrap();
    assert!(admin_inbox
        .iter()
        .any(|n| n.reposition_id == Some(first.id)));
}

#[tokio::test]
async fn transfers_are_gated_on_approval() {
    let app = TestApp::new().await;
    let reposition = app
        .services
        .repositions
        .create_reposition(TestApp::bordado(), reposition_request())
        .await
        .unwrap();

    // pendiente: cannot travel yet
    let err = app
        .services
        .reposition_transfers
        .request_transfer(TestApp::bordado(), reposition.id, Area::Plancha, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    app.services
        .repositions
        .review(
            TestApp::operaciones(),
            reposition.id,
            ReviewDecision::Aprobado,
            None,
        )
        .await
        .unwrap();

    let transfer = app
        .services
        .reposition_transfers
        .request_transfer(TestApp::bordado(), reposition.id, Area::Plancha, None)
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Pending);

    let processed = app
        .services
        .reposition_transfers
        .process(TestApp::plancha(), transfer.id, ProcessDecision::Accepted)
        .await
        .unwrap();
    assert_eq!(processed.status, TransferStatus::Accepted);

    let reposition_now = app
        .services
        .repositions
        .get(reposition.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reposition_now.current_area, Area::Plancha);
    // transfers move the ticket, never its approval state
    assert_eq!(reposition_now.status, RepositionStatus::Aprobado);

    let err = app
        .services
        .reposition_transfers
        .process(TestApp::plancha(), transfer.id, ProcessDecision::Accepted)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));
}

#[rstest::rstest]
#[case(RepositionStatus::Pendiente)]
#[case(RepositionStatus::Rechazado)]
#[case(RepositionStatus::EnProceso)]
#[case(RepositionStatus::Completado)]
#[case(RepositionStatus::Eliminado)]
#[tokio::test]
async fn every_non_approved_status_blocks_transfer_requests(#[case] status: RepositionStatus) {
    let app = TestApp::new().await;
    let reposition = app
        .services
        .repositions
        .create_reposition(TestApp::bordado(), reposition_request())
        .await
        .unwrap();

    force_status(&app, reposition.id, status).await;

    let err = app
        .services
        .reposition_transfers
        .request_transfer(TestApp::admin(), reposition.id, Area::Plancha, None)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::ValidationError(_) | ServiceError::AlreadyProcessed(_)
    );
}

#[tokio::test]
async fn review_requires_role_and_happens_once() {
    let app = TestApp::new().await;
    let reposition = app
        .services
        .repositions
        .create_reposition(TestApp::corte(), reposition_request())
        .await
        .unwrap();

    let err = app
        .services
        .repositions
        .review(
            TestApp::bordado(),
            reposition.id,
            ReviewDecision::Aprobado,
            None,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    let reviewed = app
        .services
        .repositions
        .review(
            TestApp::operaciones(),
            reposition.id,
            ReviewDecision::Rechazado,
            Some("Falta información del daño".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(reviewed.status, RepositionStatus::Rechazado);
    assert_eq!(reviewed.approved_by, Some(TestApp::operaciones().id));

    let err = app
        .services
        .repositions
        .review(
            TestApp::admin(),
            reposition.id,
            ReviewDecision::Aprobado,
            None,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));
}

#[tokio::test]
async fn completion_flow_direct_and_via_request() {
    let app = TestApp::new().await;
    let reposition = app
        .services
        .repositions
        .create_reposition(TestApp::corte(), reposition_request())
        .await
        .unwrap();

    app.services
        .repositions
        .review(
            TestApp::admin(),
            reposition.id,
            ReviewDecision::Aprobado,
            None,
        )
        .await
        .unwrap();

    // a workstation cannot complete directly, it raises a request instead
    let err = app
        .services
        .repositions
        .complete(TestApp::corte(), reposition.id, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    app.services
        .repositions
        .request_completion(TestApp::corte(), reposition.id, Some("Pieza lista".into()))
        .await
        .unwrap();

    // no state change from the request alone
    let current = app
        .services
        .repositions
        .get(reposition.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.status, RepositionStatus::Aprobado);

    let history = app
        .services
        .repositions
        .history(reposition.id)
        .await
        .unwrap();
    assert!(history
        .iter()
        .any(|h| h.action == RepositionAction::CompletionRequested));

    // approvers were pinged by role
    let ops_inbox = app
        .services
        .notifications
        .list_for_user(TestApp::operaciones().id)
        .await
        .unwrap();
    assert!(ops_inbox
        .iter()
        .any(|n| n.reposition_id == Some(reposition.id)));

    let completed = app
        .services
        .repositions
        .complete(TestApp::envios(), reposition.id, None)
        .await
        .unwrap();
    assert_eq!(completed.status, RepositionStatus::Completado);
    assert!(completed.completed_at.is_some());

    let err = app
        .services
        .repositions
        .complete(TestApp::admin(), reposition.id, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));
}

#[tokio::test]
async fn deletion_requires_a_real_reason_and_is_absorbing() {
    let app = TestApp::new().await;
    let reposition = app
        .services
        .repositions
        .create_reposition(TestApp::corte(), reposition_request())
        .await
        .unwrap();

    // 9 characters after trim: rejected
    let err = app
        .services
        .repositions
        .delete(TestApp::admin(), reposition.id, "  muy corto  ")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = app
        .services
        .repositions
        .delete(TestApp::corte(), reposition.id, "duplicado del folio 22")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    let deleted = app
        .services
        .repositions
        .delete(TestApp::admin(), reposition.id, "duplicado del folio 22")
        .await
        .unwrap();
    assert_eq!(deleted.status, RepositionStatus::Eliminado);
    assert!(deleted.deleted_at.is_some());
    assert_eq!(
        deleted.deletion_reason.as_deref(),
        Some("duplicado del folio 22")
    );
    // completion timestamp is not abused to record the deletion
    assert!(deleted.completed_at.is_none());

    // absorbing: nothing works on an eliminado ticket
    let err = app
        .services
        .repositions
        .review(
            TestApp::admin(),
            reposition.id,
            ReviewDecision::Aprobado,
            None,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));

    let err = app
        .services
        .reposition_transfers
        .request_transfer(TestApp::corte(), reposition.id, Area::Plancha, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));

    let err = app
        .services
        .repositions
        .complete(TestApp::admin(), reposition.id, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));

    // the creator keeps the audit trail, including the reason
    let history = app
        .services
        .repositions
        .history(reposition.id)
        .await
        .unwrap();
    let deleted_entry = history
        .iter()
        .find(|h| h.action == RepositionAction::Deleted)
        .expect("deleted history entry");
    assert!(deleted_entry.description.contains("duplicado del folio 22"));
}

#[tokio::test]
async fn finished_tickets_are_hidden_from_default_listings() {
    let app = TestApp::new().await;

    let visible = app
        .services
        .repositions
        .create_reposition(TestApp::corte(), reposition_request())
        .await
        .unwrap();
    let erased = app
        .services
        .repositions
        .create_reposition(TestApp::corte(), reposition_request())
        .await
        .unwrap();

    app.services
        .repositions
        .delete(TestApp::admin(), erased.id, "pedido cancelado por el hotel")
        .await
        .unwrap();

    let default_view = app
        .services
        .repositions
        .list(TestApp::corte(), Some(Area::Corte), false)
        .await
        .unwrap();
    assert!(default_view.iter().any(|r| r.id == visible.id));
    assert!(default_view.iter().all(|r| r.id != erased.id));

    // asking for the full history is not enough without the role
    let still_hidden = app
        .services
        .repositions
        .list(TestApp::corte(), Some(Area::Corte), true)
        .await
        .unwrap();
    assert!(still_hidden.iter().all(|r| r.id != erased.id));

    let admin_view = app
        .services
        .repositions
        .list(TestApp::admin(), None, true)
        .await
        .unwrap();
    assert!(admin_view.iter().any(|r| r.id == erased.id));
}

#[tokio::test]
async fn pending_transfer_dies_with_a_finalized_ticket() {
    let app = TestApp::new().await;
    let reposition = app
        .services
        .repositions
        .create_reposition(TestApp::bordado(), reposition_request())
        .await
        .unwrap();

    app.services
        .repositions
        .review(
            TestApp::operaciones(),
            reposition.id,
            ReviewDecision::Aprobado,
            None,
        )
        .await
        .unwrap();

    let transfer = app
        .services
        .reposition_transfers
        .request_transfer(TestApp::bordado(), reposition.id, Area::Plancha, None)
        .await
        .unwrap();

    // the ticket is erased while the transfer is still pending
    app.services
        .repositions
        .delete(TestApp::admin(), reposition.id, "se duplicó la solicitud")
        .await
        .unwrap();

    let err = app
        .services
        .reposition_transfers
        .process(TestApp::plancha(), transfer.id, ProcessDecision::Accepted)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyProcessed(_));
}
