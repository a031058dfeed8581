use std::collections::BTreeMap;

use clap::Subcommand;
use pomozoo_core::collection::{collected_ids, new_arrivals, rarity_breakdown};
use pomozoo_core::Action;
use serde::Serialize;

use crate::context::{print_events, print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ZooAction {
    /// Owned animals with copy counts
    List,
    /// Every animal that can be earned
    Catalog,
    /// Owned animals not yet viewed
    New,
    /// Mark animals as viewed (all owned animals when no id is given)
    Seen {
        ids: Vec<String>,
    },
    /// Distinct animals owned per rarity
    Breakdown,
}

#[derive(Serialize)]
struct OwnedAnimal<'a> {
    id: &'a str,
    name: &'a str,
    rarity: pomozoo_core::Rarity,
    copies: usize,
    new: bool,
}

pub async fn run(action: ZooAction) -> CliResult {
    let mut ctx = Context::open().await?;
    let state = ctx.holder.state();

    let dispatched = match action {
        ZooAction::List => {
            let fresh = new_arrivals(&state.collected, &state.seen_animal_ids);
            let mut copies: BTreeMap<&str, usize> = BTreeMap::new();
            for c in &state.collected {
                *copies.entry(c.animal_id.as_str()).or_default() += 1;
            }
            let owned: Vec<OwnedAnimal> = copies
                .into_iter()
                .filter_map(|(id, copies)| {
                    let animal = ctx.holder.catalog().get(id)?;
                    Some(OwnedAnimal {
                        id,
                        name: &animal.name,
                        rarity: animal.rarity,
                        copies,
                        new: fresh.contains(id),
                    })
                })
                .collect();
            return print_json(&owned);
        }
        ZooAction::Catalog => {
            let owned = collected_ids(&state.collected);
            let rows: Vec<_> = ctx
                .holder
                .catalog()
                .animals()
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "id": a.id,
                        "name": a.name,
                        "rarity": a.rarity,
                        "owned": owned.contains(a.id.as_str()),
                    })
                })
                .collect();
            return print_json(&rows);
        }
        ZooAction::New => {
            return print_json(&new_arrivals(&state.collected, &state.seen_animal_ids));
        }
        ZooAction::Breakdown => {
            let counts: BTreeMap<String, usize> = rarity_breakdown(&state.collected)
                .into_iter()
                .map(|(rarity, n)| (rarity.to_string(), n))
                .collect();
            return print_json(&counts);
        }
        ZooAction::Seen { ids } => {
            let ids = if ids.is_empty() { None } else { Some(ids) };
            ctx.holder.dispatch(Action::MarkSeen(ids))?
        }
    };

    print_events(&ctx, &dispatched)?;
    ctx.save().await
}
