//! 生產線清潔驗證評估示範
//!
//! 執行：cargo run --example line_assessment

use anyhow::Result;
use cleanval::*;
use rust_decimal::Decimal;

fn machines() -> Vec<Machine> {
    vec![
        Machine::new(1, "Bin Blender", "Solid-1")
            .with_stage("Blending")
            .with_surface_area(Decimal::from(15_000)),
        Machine::new(2, "High Shear Granulator 1", "Solid-1")
            .with_stage("Granulation")
            .with_group("HSG")
            .with_surface_area(Decimal::from(22_000)),
        Machine::new(3, "High Shear Granulator 2", "Solid-1")
            .with_stage("Granulation")
            .with_group("HSG")
            .with_surface_area(Decimal::from(26_500)),
        Machine::new(4, "Rotary Press", "Solid-1")
            .with_stage("Compression")
            .with_surface_area(Decimal::from(9_800)),
        Machine::new(5, "Capsule Filler", "Solid-1")
            .with_stage("Encapsulation")
            .with_surface_area(Decimal::from(7_400)),
        Machine::new(6, "Mixing Tank", "Liquid-1")
            .with_stage("Compounding")
            .with_surface_area(Decimal::from(48_000)),
        Machine::new(7, "Filling Line", "Liquid-1")
            .with_stage("Filling")
            .with_surface_area(Decimal::from(12_000)),
    ]
}

fn products() -> Vec<Product> {
    vec![
        Product::new("T-01", "Amlodipine 5 mg", DosageForm::Tablet)
            .with_code("AML5")
            .with_batch_size_kg(Decimal::from(120))
            .with_machines(vec![1, 2, 4])
            .with_ingredient(
                Ingredient::new("Amlodipine besylate")
                    .with_therapeutic_dose(Decimal::from(5))
                    .with_mdd(Decimal::from(10))
                    .with_solubility("Slightly soluble")
                    .with_cleanability("Medium")
                    .with_pde(Decimal::new(5, 2)),
            ),
        Product::new("T-02", "Paracetamol 500 mg", DosageForm::Tablet)
            .with_code("PCM500")
            .with_batch_size_kg(Decimal::from(400))
            .with_machines(vec![4, 3, 1])
            .with_ingredient(
                Ingredient::new("Paracetamol")
                    .with_therapeutic_dose(Decimal::from(500))
                    .with_mdd(Decimal::from(4_000))
                    .with_solubility("Sparingly soluble")
                    .with_cleanability("Easy")
                    .with_ld50(Decimal::from(338)),
            ),
        Product::new("C-01", "Omeprazole 20 mg", DosageForm::Capsule)
            .with_code("OMP20")
            .with_batch_size_kg(Decimal::from(90))
            .with_critical("Light-sensitive API with degradation products")
            .with_machines(vec![1, 5])
            .with_ingredient(
                Ingredient::new("Omeprazole")
                    .with_therapeutic_dose(Decimal::from(20))
                    .with_mdd(Decimal::from(40))
                    .with_solubility("Very slightly soluble")
                    .with_cleanability("Difficult")
                    .with_pde(Decimal::new(4, 1)),
            ),
        Product::new("L-01", "Cough Syrup", DosageForm::Liquid)
            .with_code("CS100")
            .with_batch_size_kg(Decimal::from(2_000))
            .with_machines(vec![6, 7])
            .with_ingredient(
                Ingredient::new("Dextromethorphan")
                    .with_therapeutic_dose(Decimal::from(15))
                    .with_mdd(Decimal::from(120))
                    .with_solubility("Soluble")
                    .with_cleanability("Easy"),
            ),
    ]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = CvConfig::default();
    let assessment = Assessment::new(config)?;
    let mut registry = TrainRegistry::new();

    let result = assessment.run(&products(), &machines(), &mut registry)?;

    println!("=== 設備鏈 ===");
    for train in &result.trains {
        let maco = result.maco_results.iter().find(|m| m.train_id == train.id);
        println!(
            "#{:<3} {:<40} ESSA {:>8} cm²  MACO {}",
            train.id,
            train.path_key(),
            train.metrics.essa,
            maco.map(|m| format!("{} mg ({:?})", m.final_maco.round_dp(3), m.governing_method))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    println!();
    println!("=== RPN ===");
    for rpn in &result.rpn_results {
        println!(
            "{:<6} {:<22} RPN {:>4}  {}",
            rpn.product_id,
            rpn.ingredient_name,
            rpn.rpn,
            rpn.rating.label()
        );
    }

    println!();
    println!("=== 驗證研究 ===");
    for plan in &result.study_plans {
        println!("[{}] 設備 {} 台", plan.group, plan.universe.len());
        for study in &plan.studies {
            println!(
                "  {}. {} ({})  {}",
                study.study_number, study.product_name, study.product_id, study.justification
            );
        }
    }

    for warning in &result.warnings {
        println!("警告 [{:?}] {}: {}", warning.severity, warning.subject, warning.message);
    }

    println!();
    println!("設備鏈登記表:\n{}", registry.to_json()?);

    Ok(())
}
