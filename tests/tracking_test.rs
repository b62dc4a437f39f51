mod common;

use assert_matches::assert_matches;
use taller_api::domain::Area;
use taller_api::entities::reposition::{RepositionType, Urgency};
use taller_api::errors::ServiceError;
use taller_api::services::reposition_transfers::ProcessDecision;
use taller_api::services::repositions::{CreateRepositionRequest, ReviewDecision};
use taller_api::services::tracking::StepState;

use common::TestApp;

fn reposition_request() -> CreateRepositionRequest {
    CreateRepositionRequest {
        r#type: RepositionType::Reproceso,
        solicitante_nombre: "Luis Peña".to_string(),
        no_solicitud: "SOL-300".to_string(),
        no_hoja: None,
        causante_dano: "Plancha 1".to_string(),
        descripcion_suceso: "Quemadura leve en el cuello de la prenda".to_string(),
        modelo_prenda: "M-330".to_string(),
        tela: "Poliéster".to_string(),
        color: "Azul".to_string(),
        tipo_pieza: "Cuello".to_string(),
        urgencia: Urgency::Intermedio,
        observaciones: None,
        pieces: vec![],
    }
}

async fn accepted_hop(app: &TestApp, reposition_id: uuid::Uuid, from: taller_api::domain::Actor, to_area: Area, to_actor: taller_api::domain::Actor) {
    let transfer = app
        .services
        .reposition_transfers
        .request_transfer(from, reposition_id, to_area, None)
        .await
        .unwrap();
    app.services
        .reposition_transfers
        .process(to_actor, transfer.id, ProcessDecision::Accepted)
        .await
        .unwrap();
}

#[tokio::test]
async fn tracking_reflects_visited_current_and_pending_steps() {
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
            TestApp::operaciones(),
            reposition.id,
            ReviewDecision::Aprobado,
            None,
        )
        .await
        .unwrap();

    accepted_hop(
        &app,
        reposition.id,
        TestApp::corte(),
        Area::Bordado,
        TestApp::bordado(),
    )
    .await;
    accepted_hop(
        &app,
        reposition.id,
        TestApp::bordado(),
        Area::Ensamble,
        TestApp::ensamble(),
    )
    .await;

    let tracking = app.services.tracking.tracking(reposition.id).await.unwrap();
    assert_eq!(tracking.current_area, Area::Ensamble);

    let state_of = |area: Area| {
        tracking
            .steps
            .iter()
            .find(|s| s.area == area)
            .map(|s| s.state)
            .unwrap()
    };

    // never visited, upstream of the starting area
    assert_eq!(state_of(Area::Patronaje), StepState::Pending);
    // starting area, ticket has moved on
    assert_eq!(state_of(Area::Corte), StepState::Completed);
    // visited through an accepted transfer
    assert_eq!(state_of(Area::Bordado), StepState::Completed);
    assert_eq!(state_of(Area::Ensamble), StepState::Current);
    assert_eq!(state_of(Area::Plancha), StepState::Pending);
    assert_eq!(state_of(Area::Calidad), StepState::Pending);
    assert_eq!(state_of(Area::Operaciones), StepState::Pending);

    // 2 completed steps + half credit for the current one, out of 7
    let expected = (2.0 + 0.5) / 7.0 * 100.0;
    assert!((tracking.progress_pct - expected).abs() < 0.01);
}

#[tokio::test]
async fn fresh_ticket_only_has_its_current_step() {
    let app = TestApp::new().await;
    let reposition = app
        .services
        .repositions
        .create_reposition(TestApp::corte(), reposition_request())
        .await
        .unwrap();

    let tracking = app.services.tracking.tracking(reposition.id).await.unwrap();
    assert_eq!(tracking.current_area, Area::Corte);

    let completed = tracking
        .steps
        .iter()
        .filter(|s| s.state == StepState::Completed)
        .count();
    assert_eq!(completed, 0);

    let expected = 0.5 / 7.0 * 100.0;
    assert!((tracking.progress_pct - expected).abs() < 0.01);
}

#[tokio::test]
async fn tracking_unknown_reposition_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .services
        .tracking
        .tracking(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
