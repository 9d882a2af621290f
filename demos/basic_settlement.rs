//! Basic settlement example.
//!
//! Three friends split a two-day circle run. Each logs what they bought
//! for the others; the engine works out who is owed what and what each
//! pair nets to.

use circle_settlement::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  circle-settlement: Basic Settlement Example ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let store = InMemoryStore::new();
    let drafts = vec![
        RecordDraft::new().name("Circle A").registrant("alice").buyer("bob").amount(1500).day("1"),
        RecordDraft::new().name("Circle B").registrant("alice").buyer("carol").amount(800).day("1"),
        RecordDraft::new().name("Circle C").registrant("bob").buyer("alice").amount(600).day("1"),
        RecordDraft::new().name("Circle D").registrant("carol").buyer("bob").amount(2200).day("2"),
        RecordDraft::new().name("Circle E").registrant("alice").buyer("alice").amount(900).day("2"),
    ];

    let mut ids = Vec::new();
    for draft in drafts {
        match store.insert(draft) {
            Ok(record) => ids.push(record.id()),
            Err(e) => {
                eprintln!("insert failed: {}", e);
                return;
            }
        }
    }

    // Circle A turned out cheaper than estimated.
    match store.get(ids[0]) {
        Ok(record) => {
            let mut draft = record.to_draft();
            draft.actual_amount = Some(1350);
            if let Err(e) = store.update(record.id(), draft) {
                eprintln!("update failed: {}", e);
            }
        }
        Err(e) => eprintln!("lookup failed: {}", e),
    }
    for id in &ids {
        if let Err(e) = store.set_completed(*id, true) {
            eprintln!("completing #{} failed: {}", id, e);
        }
    }

    // --- Scenario 1: who is owed what ---
    println!("━━━ Scenario 1: Per-Registrant Summary ━━━\n");
    match aggregate_from_store(&store, None) {
        Ok(report) => println!("{}", report),
        Err(e) => eprintln!("aggregation failed: {}", e),
    }

    // --- Scenario 2: pairwise nets ---
    println!("━━━ Scenario 2: Pairwise Netting ━━━\n");
    let pairs = [("bob", "alice"), ("alice", "bob"), ("bob", "carol")];
    for (buyer, registrant) in pairs {
        match NettingEngine::net_balance_in(&store, &buyer.into(), &registrant.into(), None) {
            Ok(net) => println!(
                "  {:<6} owes {:<6} actual {:>6}  est {:>6}",
                net.to, net.from, net.actual_amount, net.amount
            ),
            Err(e) => eprintln!("netting failed: {}", e),
        }
    }
}
