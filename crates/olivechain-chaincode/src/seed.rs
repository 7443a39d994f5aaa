//! Sample data for `InitLedger`

use olivechain_integrity::NewWaste;

/// Wastes written by `InitLedger` when they are not already present
pub fn sample_wastes() -> Vec<NewWaste> {
    vec![NewWaste {
        id: "waste1".into(),
        waste_type: "Olive Branches".into(),
        quantity: 50.5,
        harvest_date: "2025-06-01".into(),
        owner: "farmer1".into(),
        farm: Some("Olive Farm Alpha".into()),
        location: Some("Andalusia, Spain".into()),
    }]
}
