use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named work station in the production pipeline.
///
/// `Admin` is a privileged pseudo-area (it never holds pieces); `Envios` is
/// the terminal shipping sink. Everything else is a physical work area a
/// garment batch can sit in.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Area {
    #[sea_orm(string_value = "patronaje")]
    Patronaje,
    #[sea_orm(string_value = "corte")]
    Corte,
    #[sea_orm(string_value = "bordado")]
    Bordado,
    #[sea_orm(string_value = "ensamble")]
    Ensamble,
    #[sea_orm(string_value = "plancha")]
    Plancha,
    #[sea_orm(string_value = "calidad")]
    Calidad,
    #[sea_orm(string_value = "operaciones")]
    Operaciones,
    #[sea_orm(string_value = "envios")]
    Envios,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// The fixed progress sequence rendered by the reposition tracking view.
pub const TRACKING_SEQUENCE: [Area; 7] = [
    Area::Patronaje,
    Area::Corte,
    Area::Bordado,
    Area::Ensamble,
    Area::Plancha,
    Area::Calidad,
    Area::Operaciones,
];

impl Area {
    /// Whether this area physically holds pieces.
    pub fn is_workstation(self) -> bool {
        !matches!(self, Area::Admin)
    }

    /// Downstream areas a transfer from `self` would normally target.
    ///
    /// This is UI guidance only: transfer validation is done against the
    /// live ledger balance and the transfer's own state, never against
    /// this fan-out.
    pub fn legal_destinations(self) -> &'static [Area] {
        use Area::*;
        match self {
            Patronaje => &[Corte, Bordado, Ensamble, Plancha, Calidad, Operaciones, Envios],
            Corte => &[Bordado, Ensamble, Plancha, Calidad, Operaciones, Envios],
            Bordado => &[Ensamble, Plancha, Calidad, Operaciones, Envios],
            Ensamble => &[Plancha, Calidad, Operaciones, Envios],
            Plancha => &[Calidad, Operaciones, Envios],
            Calidad => &[Operaciones, Envios],
            Operaciones => &[Envios],
            Envios => &[],
            Admin => &[
                Patronaje, Corte, Bordado, Ensamble, Plancha, Calidad, Operaciones, Envios,
            ],
        }
    }
}

/// An already-authenticated caller: stable numeric id plus an area claim.
///
/// Authentication itself happens upstream; the services trust this claim
/// for their own area/role preconditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub area: Area,
}

impl Actor {
    pub fn new(id: i32, area: Area) -> Self {
        Self { id, area }
    }

    pub fn is_admin(&self) -> bool {
        self.area == Area::Admin
    }

    /// Areas allowed to register new production orders.
    pub fn can_manage_orders(&self) -> bool {
        matches!(self.area, Area::Corte | Area::Admin | Area::Envios)
    }

    /// Only shipping closes out an order.
    pub fn can_complete_orders(&self) -> bool {
        self.area == Area::Envios
    }

    /// Areas allowed to approve or reject a reposition request.
    pub fn can_review_repositions(&self) -> bool {
        matches!(self.area, Area::Operaciones | Area::Admin | Area::Envios)
    }

    /// Areas allowed to complete or delete a reposition directly.
    pub fn can_finalize_repositions(&self) -> bool {
        matches!(self.area, Area::Admin | Area::Envios)
    }

    /// Recipients of completion-approval requests raised by other areas.
    pub fn can_approve_completion(&self) -> bool {
        matches!(self.area, Area::Admin | Area::Operaciones)
    }

    /// Whether this actor may resolve a transfer addressed to `to_area`.
    pub fn can_process_transfer_to(&self, to_area: Area) -> bool {
        self.area == to_area || self.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn envios_is_a_terminal_sink() {
        assert!(Area::Envios.legal_destinations().is_empty());
    }

    #[test]
    fn admin_reaches_every_workstation() {
        let dests = Area::Admin.legal_destinations();
        for area in Area::iter().filter(|a| a.is_workstation()) {
            assert!(dests.contains(&area), "{area} missing from admin fan-out");
        }
        assert!(!dests.contains(&Area::Admin));
    }

    #[test]
    fn fan_out_only_moves_downstream() {
        // corte never sends back to patronaje
        assert!(!Area::Corte.legal_destinations().contains(&Area::Patronaje));
        assert!(Area::Corte.legal_destinations().contains(&Area::Bordado));
    }

    #[test]
    fn area_round_trips_through_display() {
        for area in Area::iter() {
            let parsed: Area = area.to_string().parse().expect("parse back");
            assert_eq!(parsed, area);
        }
    }

    #[test]
    fn transfer_processing_requires_destination_area_or_admin() {
        let bordado = Actor::new(7, Area::Bordado);
        assert!(bordado.can_process_transfer_to(Area::Bordado));
        assert!(!bordado.can_process_transfer_to(Area::Plancha));
        assert!(Actor::new(1, Area::Admin).can_process_transfer_to(Area::Plancha));
    }
}
