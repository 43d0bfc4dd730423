use scrollsim_engine::{
    AbilityPoint, ConfigError, Execution, RunOptions, ScrollCatalog, ScrollDefinition,
    SimulationConfig, simulate,
};

fn guaranteed_scroll() -> ScrollDefinition {
    ScrollDefinition::new("guaranteed", 1.0, false, 5)
}

#[test]
fn guaranteed_plan_produces_exact_summary() {
    let config = SimulationConfig::builder(5, 1000)
        .threshold_ability(5)
        .scroll(guaranteed_scroll(), 5)
        .build()
        .unwrap();

    for execution in [Execution::Sequential, Execution::Parallel] {
        let summary = simulate(
            &config,
            1337,
            &RunOptions::default()
                .with_execution(execution)
                .with_batch_size(128),
        )
        .unwrap();

        assert_eq!(summary.destroyed_count, 0);
        assert!(summary.destruction_rate.abs() < f64::EPSILON);
        let histogram: Vec<u64> = summary
            .success_count_distribution
            .iter()
            .map(|bucket| bucket.count)
            .collect();
        assert_eq!(histogram, vec![0, 0, 0, 0, 0, 1000]);
        assert_eq!(
            summary.ability_distribution,
            vec![AbilityPoint {
                ability: 25,
                frequency: 1000
            }]
        );
        assert_eq!(summary.qualified_count, 1000);
        assert!((summary.qualified_rate - 1.0).abs() < f64::EPSILON);
        assert!((summary.average_ability_of_survivors - 25.0).abs() < 1e-9);
        assert!((summary.success_count_distribution[5].percentage - 100.0).abs() < 1e-9);
    }
}

#[test]
fn standard_sure_scroll_in_every_slot_yields_ability_five() {
    let catalog = ScrollCatalog::standard();
    let config = SimulationConfig::builder(5, 1000)
        .threshold_ability(5)
        .scroll(catalog.get("100%").unwrap().clone(), 5)
        .build()
        .unwrap();
    let summary = simulate(&config, 7, &RunOptions::default()).unwrap();

    assert_eq!(summary.destroyed_count, 0);
    assert_eq!(summary.success_count_distribution[5].count, 1000);
    assert_eq!(
        summary.ability_distribution,
        vec![AbilityPoint {
            ability: 5,
            frequency: 1000
        }]
    );
    assert_eq!(summary.qualified_count, 1000);
    assert_eq!(format!("{:.2}", summary.average_ability_of_survivors), "5.00");
}

#[test]
fn over_allocated_plan_is_rejected_before_any_trial() {
    let catalog = ScrollCatalog::standard();
    let result = SimulationConfig::builder(5, 1000)
        .scroll(catalog.get("60%").unwrap().clone(), 4)
        .scroll(catalog.get("30%").unwrap().clone(), 2)
        .build();
    assert_eq!(
        result.unwrap_err(),
        ConfigError::OverAllocatedSlots { total: 6, limit: 5 }
    );
}

#[test]
fn empty_plan_leaves_every_item_untouched() {
    let config = SimulationConfig::builder(10, 500)
        .threshold_ability(1)
        .build()
        .unwrap();
    let summary = simulate(&config, 3, &RunOptions::default()).unwrap();
    assert_eq!(summary.destroyed_count, 0);
    assert_eq!(summary.success_count_distribution[0].count, 500);
    assert_eq!(summary.qualified_count, 0);
    assert_eq!(summary.qualified_count_at(0), 500);
    assert!(summary.average_ability_of_survivors.abs() < f64::EPSILON);
}

#[test]
fn summary_serializes_for_reports() {
    let config = SimulationConfig::builder(5, 100)
        .scroll(guaranteed_scroll(), 2)
        .build()
        .unwrap();
    let summary = simulate(&config, 1, &RunOptions::default()).unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["trial_count"], 100);
    assert_eq!(json["ability_distribution"][0]["ability"], 10);
    assert_eq!(json["success_count_distribution"].as_array().unwrap().len(), 6);
}
