// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::cmd::query::print_due_cards;
use crate::cmd::query::print_status;
use crate::cmd::review::grade_card;
use crate::cmd::review::remove_card;
use crate::cmd::snapshot::export_snapshot;
use crate::cmd::snapshot::import_snapshot;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::grade::ReviewResult;
use crate::types::timestamp::Timestamp;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the review database.
    #[arg(long, global = true)]
    db: Option<String>,
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grade a review of a card.
    Grade {
        /// The card's identifier.
        card_id: String,
        /// One of again, hard, good, easy (or 1 to 4).
        grade: ReviewResult,
        /// How long the answer took, in seconds.
        #[arg(long)]
        time: Option<f64>,
    },
    /// List the cards that are due, earliest first.
    Due {
        /// Cards to consider. Defaults to every card with a review record.
        card_ids: Vec<String>,
    },
    /// Show a card's review state.
    Status {
        /// The card's identifier.
        card_id: String,
    },
    /// Print study statistics.
    Stats {
        /// Which format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        /// Cards to consider. Defaults to every card with a review record.
        card_ids: Vec<String>,
    },
    /// Forget a card's review state.
    Remove {
        /// The card's identifier.
        card_id: String,
    },
    /// Write the review state to a snapshot file.
    Export {
        /// Path to the output file.
        path: PathBuf,
    },
    /// Replace the review state with a snapshot file.
    Import {
        /// Path to the snapshot file.
        path: PathBuf,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let mut collection = Collection::open(cli.db, cli.config)?;
    let now = Timestamp::now();
    match cli.command {
        Command::Grade {
            card_id,
            grade,
            time,
        } => grade_card(&mut collection, CardId::new(card_id), grade, time, now),
        Command::Due { card_ids } => print_due_cards(&collection, card_ids, now),
        Command::Status { card_id } => print_status(&collection, CardId::new(card_id), now),
        Command::Stats { format, card_ids } => print_stats(&collection, card_ids, format, now),
        Command::Remove { card_id } => remove_card(&mut collection, CardId::new(card_id), now),
        Command::Export { path } => export_snapshot(&collection, &path),
        Command::Import { path } => import_snapshot(&mut collection, &path, now),
    }
}
