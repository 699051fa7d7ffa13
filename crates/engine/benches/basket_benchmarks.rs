use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;

use smartstore_core::{
    BasketId, CustomerId, InventoryId, InventoryLocation, ProductId, StoreId, StoreLocation,
};
use smartstore_customers::{CreateCustomer, CustomerType};
use smartstore_engine::{ProvisionAisle, ProvisionShelf, StoreService};
use smartstore_inventory::{CreateInventory, InventoryType};
use smartstore_products::{CreateProduct, Temperature};
use smartstore_stores::{AisleLocation, CreateStore, ShelfLevel};

const CAPACITY: i64 = 1_000_000;

/// One store, one aisle, one shelf holding `CAPACITY` units of `p1`, and
/// `shoppers` registered customers each holding basket `b<i>`.
fn setup(shoppers: usize) -> StoreService {
    let service = StoreService::new();
    service
        .provision_store(CreateStore {
            store_id: StoreId::new("s1"),
            address: "bench".to_string(),
            description: "bench".to_string(),
        })
        .unwrap();
    service
        .provision_aisle(ProvisionAisle {
            location: StoreLocation::new("s1", "a1"),
            name: "a1".to_string(),
            description: String::new(),
            aisle_location: AisleLocation::Floor,
        })
        .unwrap();
    service
        .provision_shelf(ProvisionShelf {
            location: InventoryLocation::new("s1", "a1", "sh1"),
            name: "sh1".to_string(),
            level: ShelfLevel::Low,
            description: String::new(),
            temperature: Temperature::Ambient,
        })
        .unwrap();
    service
        .provision_product(CreateProduct {
            product_id: ProductId::new("p1"),
            name: "p1".to_string(),
            description: String::new(),
            size: "1".to_string(),
            category: "bench".to_string(),
            unit_price_cents: 100,
            temperature: Temperature::Ambient,
        })
        .unwrap();
    service
        .provision_inventory(CreateInventory {
            inventory_id: InventoryId::new("inv1"),
            location: InventoryLocation::new("s1", "a1", "sh1"),
            capacity: CAPACITY,
            count: CAPACITY,
            product_id: ProductId::new("p1"),
            kind: InventoryType::Standard,
        })
        .unwrap();

    for i in 0..shoppers {
        let customer_id = CustomerId::new(format!("c{i}"));
        service
            .provision_customer(CreateCustomer {
                customer_id: customer_id.clone(),
                first_name: "bench".to_string(),
                last_name: format!("{i}"),
                kind: CustomerType::Registered,
                email: String::new(),
                account_address: String::new(),
            })
            .unwrap();
        service
            .update_customer(&customer_id, StoreLocation::new("s1", "a1"))
            .unwrap();
        service.provision_basket(BasketId::new(format!("b{i}"))).unwrap();
        service
            .assign_customer_basket(&customer_id, &BasketId::new(format!("b{i}")))
            .unwrap();
    }
    service
}

fn bench_add_remove_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket_latency");
    let service = setup(1);
    let basket = BasketId::new("b0");
    let product = ProductId::new("p1");

    group.bench_function("add_then_remove", |b| {
        b.iter(|| {
            service
                .add_basket_product(black_box(&basket), black_box(&product), 1)
                .unwrap();
            service
                .remove_basket_product(black_box(&basket), black_box(&product), 1)
                .unwrap();
        })
    });

    group.finish();
}

fn bench_parallel_shoppers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_shoppers");
    let rounds = 100;

    for shoppers in [1usize, 4, 8] {
        group.throughput(Throughput::Elements((shoppers * rounds * 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(shoppers), &shoppers, |b, &shoppers| {
            let service = Arc::new(setup(shoppers));
            let product = ProductId::new("p1");
            b.iter(|| {
                std::thread::scope(|scope| {
                    for i in 0..shoppers {
                        let service = &service;
                        let product = &product;
                        scope.spawn(move || {
                            let basket = BasketId::new(format!("b{i}"));
                            for _ in 0..rounds {
                                service.add_basket_product(&basket, product, 1).unwrap();
                                service.remove_basket_product(&basket, product, 1).unwrap();
                            }
                        });
                    }
                });
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_add_remove_latency, bench_parallel_shoppers);
criterion_main!(benches);
