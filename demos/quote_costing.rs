//! 報價計算與採購流程示例
//!
//! 執行：`RUST_LOG=debug cargo run --example quote_costing`

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shopquote::prelude::*;
use shopquote::quote_core::{Paint, ShippingAddress, ShippingMethod};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 報價計算示例 ===\n");

    // 1. 板材與塗裝設定
    let sheet_settings = SheetSettings::new()
        .with_price_per_pound("Mild Steel", Decimal::new(55, 2))
        .with_pounds_per_square_foot("Mild Steel", "12 Gauge", Decimal::new(4375, 3))
        .with_pounds_per_square_foot("Mild Steel", "16 Gauge", Decimal::new(2500, 3))
        .with_laser_cost("CO2", Decimal::from(150));
    let paints = PaintInventory::new().with_paint(Paint {
        name: "Safety Yellow".to_string(),
        price_per_gallon: Decimal::from(85),
        average_coverage: Decimal::from(300),
    });

    // 2. 報價內容
    let sheet = Sheet::new("Mild Steel", "12 Gauge", Decimal::from(120), Decimal::from(60));
    let mut bracket = LaserCutPart::new("Bracket", Decimal::from(240))
        .with_weight_and_machine_time(Decimal::new(35, 2), Decimal::from(12))
        .with_process_costs(Decimal::new(40, 2), Decimal::new(25, 2))
        .with_surface_area(Decimal::from(24));
    bracket.coating.uses_paint = true;
    bracket.coating.paint_name = Some("Safety Yellow".to_string());

    let nest = Nest::new("Frame Nest", sheet)
        .with_sheets(Decimal::from(3), Decimal::from(900))
        .with_part(bracket)
        .with_part(
            LaserCutPart::new("Gusset", Decimal::from(260))
                .with_weight_and_machine_time(Decimal::new(20, 2), Decimal::from(8)),
        );

    let settings = QuoteSettings::default()
        .with_match_item_to_sheet_cost(true)
        .with_component_markup(true, false);
    settings.validate().context("報價設定無效")?;

    let mut quote = Quote::new("Q-1042", settings)
        .with_nest(nest)
        .with_component(Component::new("M8 Bolt", Decimal::from(100), Decimal::new(12, 2)));

    // 3. 計算
    let calculator = QuotePriceCalculator::new(&sheet_settings, &paints);
    let result = calculator.recalculate(&mut quote);

    for nest in quote.nests_with_parts() {
        println!("{}  切割時間 {}", nest.display_name(), nest.formatted_total_cutting_time());
        for part in &nest.laser_cut_parts {
            println!("  - {} × {} @ {}", part.name, part.quantity, part.price);
        }
    }
    if let Some(outcome) = &result.reconciliation {
        println!(
            "\n價格對齊：{} 次迭代，差額 {}，收斂 {}",
            outcome.iterations, outcome.difference, outcome.converged
        );
    }
    println!("零件合計:   {}", result.laser_cut_parts_total.round_dp(2));
    println!("外購件合計: {}", result.components_total.round_dp(2));
    println!("板材合計:   {}", result.sheet_total.round_dp(2));
    for warning in &result.warnings {
        println!("[{:?}] {}: {}", warning.severity, warning.subject, warning.message);
    }

    println!("\n=== 採購流程示例 ===\n");

    // 4. 採購單儲存、套用、重新載入
    let today = NaiveDate::from_ymd_opt(2025, 11, 3).context("無效日期")?;
    let arrival = NaiveDate::from_ymd_opt(2025, 11, 20).context("無效日期")?;

    let mut components = ComponentsInventory::new()
        .with_component(Component::new("M8 Bolt", Decimal::from(40), Decimal::new(12, 2)).with_id(1));
    let mut sheets = SheetsInventory::new().with_sheet(
        Sheet::new("Mild Steel", "12 Gauge", Decimal::from(120), Decimal::from(60)).with_id(2),
    );

    let sync = PurchaseOrderSync::new(InMemorySyncService::new());
    let mut vendor = Vendor::new("Acme Steel");
    sync.save_vendor(&mut vendor).await?;
    let mut address = ShippingAddress::new("Main Shop", "1 Industrial Way");
    sync.save_shipping_address(&mut address).await?;

    let mut manager = PurchaseOrderManager::new();
    let number = manager.next_purchase_order_number(&vendor.name);
    let mut po = PurchaseOrder::new(vendor.clone(), number, today)
        .with_shipping(ShippingMethod::FedEx, address)
        .with_component(1, Decimal::from(500))
        .with_sheet(2, Decimal::from(10));
    let po_id = sync.save_purchase_order(&mut po, &components, &sheets).await?;
    println!("{} 已儲存，ID {}", po, po_id);

    manager.add_purchase_order(po);
    let report = manager.apply_orders(po_id, &mut components, &mut sheets, arrival, today)?;
    println!("建立待到貨訂單 {} 筆", report.created.len());

    let loaded = sync.load(&mut manager, &components, &sheets).await?;
    println!(
        "重新載入：採購單 {} 張，連結訂單 {} 張",
        loaded.purchase_orders, loaded.linked_orders
    );

    // 5. 到貨
    let ledger = OrderLedger::new("receiving");
    let bolt = components
        .get_by_id_mut(1)
        .context("找不到外購件")?;
    let order_id = bolt.orders.first().map(|order| order.id).context("沒有待到貨訂單")?;
    let transition = ledger.apply_now(
        bolt,
        order_id,
        OrderAction::AddIncomingQuantity {
            quantity: Decimal::from(200),
        },
    )?;
    println!(
        "{} 到貨 200：庫存 {} -> {}，剩餘 {}",
        bolt.part_number, transition.stock_before, transition.stock_after, transition.remaining
    );

    tracing::info!("示例完成");
    Ok(())
}
