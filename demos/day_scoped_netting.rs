//! Day-scoped netting example.
//!
//! Shows how a day filter changes the answer, and how the reverse query
//! of a pair reports zero rather than a flipped debt.

use circle_settlement::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  circle-settlement: Day-Scoped Netting       ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let records = vec![
        RecordDraft::new().buyer("B").registrant("R").amount(1000).actual_amount(1000).day("1")
            .into_record(RecordId::new(1)),
        RecordDraft::new().buyer("R").registrant("B").amount(400).actual_amount(400).day("1")
            .into_record(RecordId::new(2)),
        RecordDraft::new().buyer("R").registrant("B").amount(900).actual_amount(900).day("2")
            .into_record(RecordId::new(3)),
    ];

    println!("Records:");
    println!("  day 1: B owes R 1000");
    println!("  day 1: R owes B  400");
    println!("  day 2: R owes B  900\n");

    let b = ParticipantId::new("B");
    let r = ParticipantId::new("R");
    let day_one = Day::new("1");

    for (label, day) in [("all days", None), ("day 1", Some(&day_one))] {
        let gross = NettingEngine::pairwise_gross(&records, &b, &r, day);
        println!("━━━ {} ━━━", label);
        println!("  B → R gross: {}", gross.actual_owed);
        println!("  R → B gross: {}", gross.actual_reverse);
        for (buyer, registrant) in [(&b, &r), (&r, &b)] {
            match NettingEngine::net_balance(&records, buyer, registrant, day) {
                Ok(net) => println!("  net_balance({}, {}) = {}", buyer, registrant, net.actual_amount),
                Err(e) => eprintln!("  netting failed: {}", e),
            }
        }
        println!();
    }
}
