use chrono::NaiveDate;
use clap::Subcommand;
use pomozoo_core::stats::day_of;

use crate::context::{print_json, signed_in_backend, CliResult, Context};

#[derive(Subcommand)]
pub enum RoomAction {
    /// Create a room and join it as owner
    Create {
        name: String,
    },
    /// List rooms
    List {
        /// Only rooms you belong to
        #[arg(long)]
        mine: bool,
    },
    /// Join a room by invite code
    Join {
        code: String,
    },
    /// Leave a room
    Leave {
        room_id: String,
    },
    /// List a room's members
    Members {
        room_id: String,
    },
    /// Every member's study summary for one day
    Board {
        room_id: String,
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub async fn run(action: RoomAction) -> CliResult {
    let mut ctx = Context::open().await?;
    let client = signed_in_backend(&mut ctx).await?;

    match action {
        RoomAction::Create { name } => {
            if name.trim().is_empty() {
                return Err("room name must not be empty".into());
            }
            print_json(&ctx.remote(client.create_room(&name)).await?)
        }
        RoomAction::List { mine } => {
            let rooms = if mine {
                ctx.remote(client.my_rooms()).await?
            } else {
                ctx.remote(client.list_rooms()).await?
            };
            print_json(&rooms)
        }
        RoomAction::Join { code } => {
            let room = ctx
                .remote(client.find_room_by_code(&code))
                .await?
                .ok_or_else(|| format!("no room with invite code {code}"))?;
            let membership = ctx.remote(client.join_room(&room.id)).await?;
            tracing::info!(room_id = %room.id, "joined room");
            print_json(&membership)
        }
        RoomAction::Leave { room_id } => {
            ctx.remote(client.leave_room(&room_id)).await?;
            println!("left {room_id}");
            Ok(())
        }
        RoomAction::Members { room_id } => {
            print_json(&ctx.remote(client.list_members(&room_id)).await?)
        }
        RoomAction::Board { room_id, date } => {
            let date = date.unwrap_or_else(|| day_of(chrono::Utc::now()));
            let mut rows = ctx.remote(client.fetch_room_summaries(&room_id, date)).await?;
            rows.sort_by(|a, b| b.total_study_minutes().cmp(&a.total_study_minutes()));
            print_json(&rows)
        }
    }
}
