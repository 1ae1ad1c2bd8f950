//! Stock checks and per-procedure material cost.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{MaterialRow, MaterialUsageRow};
use crate::repository::{Repository, StoreError};

/// Below its configured minimum. Materials without a minimum are never low.
pub fn is_low_stock(material: &MaterialRow) -> bool {
    material
        .minimum_stock
        .is_some_and(|minimum| material.stock_quantity < minimum)
}

pub async fn get_low_stock_materials(repo: &dyn Repository) -> Result<Vec<MaterialRow>, StoreError> {
    let mut materials = repo.list_materials().await?;
    materials.retain(is_low_stock);
    Ok(materials)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCostLine {
    pub material_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity_used: f64,
    pub unit_price: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureCost {
    pub procedure_type: String,
    pub total_cost: f64,
    pub materials: Vec<MaterialCostLine>,
}

/// Sum of `quantity_used * unit_price` across the materials linked to a procedure type.
pub fn procedure_cost(procedure_type: &str, usage: Vec<MaterialUsageRow>) -> ProcedureCost {
    let materials: Vec<MaterialCostLine> = usage
        .into_iter()
        .map(|u| MaterialCostLine {
            cost: u.quantity_used * u.unit_price,
            material_id: u.material_id,
            name: u.material_name,
            unit: u.unit,
            quantity_used: u.quantity_used,
            unit_price: u.unit_price,
        })
        .collect();

    ProcedureCost {
        procedure_type: procedure_type.to_string(),
        total_cost: materials.iter().map(|m| m.cost).sum(),
        materials,
    }
}

pub async fn calculate_procedure_cost(
    repo: &dyn Repository,
    procedure_type: &str,
) -> Result<ProcedureCost, StoreError> {
    let usage = repo.list_material_usage(procedure_type).await?;
    Ok(procedure_cost(procedure_type, usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProcedureMaterialRequest;
    use crate::test_support::*;

    #[tokio::test]
    async fn low_stock_requires_a_minimum_and_a_shortfall() {
        let repo = memory_repo().await;
        seed_material(&repo, "Gutta-percha points", 0.5, 3, Some(10)).await;
        seed_material(&repo, "Sodium hypochlorite", 4.0, 10, Some(10)).await;
        seed_material(&repo, "Paper points", 0.2, 0, None).await;
        seed_material(&repo, "K-files", 2.5, 50, Some(20)).await;

        let low = get_low_stock_materials(&repo).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Gutta-percha points");
        assert!(low.iter().all(|m| m.minimum_stock.is_some()));
        assert!(low.iter().all(|m| Some(m.stock_quantity) < m.minimum_stock));
    }

    #[tokio::test]
    async fn treatment_cost_sums_linked_materials() {
        let repo = memory_repo().await;
        let files = seed_material(&repo, "Rotary files", 10.0, 40, None).await;
        let sealer = seed_material(&repo, "Sealer", 5.0, 40, None).await;
        let unrelated = seed_material(&repo, "Retreatment solvent", 99.0, 40, None).await;

        for (ty, material_id, qty) in [
            ("TREATMENT", files.material_id, 2.0),
            ("TREATMENT", sealer.material_id, 3.0),
            ("RETREATMENT", unrelated.material_id, 1.0),
        ] {
            repo.create_procedure_material(&CreateProcedureMaterialRequest {
                procedure_type: ty.to_string(),
                material_id,
                quantity_used: qty,
            })
            .await
            .unwrap();
        }

        let cost = calculate_procedure_cost(&repo, "TREATMENT").await.unwrap();
        assert_eq!(cost.total_cost, 35.0);
        assert_eq!(cost.materials.len(), 2);
    }

    #[tokio::test]
    async fn procedure_without_materials_costs_nothing() {
        let repo = memory_repo().await;
        let cost = calculate_procedure_cost(&repo, "PULPOTOMY").await.unwrap();
        assert_eq!(cost.total_cost, 0.0);
        assert!(cost.materials.is_empty());
    }
}
