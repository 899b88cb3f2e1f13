use crate::cli::{ChannelsAction, Cli, OutputFormat};
use crate::commands::{find_table, Result};
use crate::output::{emit, format_channel_table, format_channel_tables, OutputData};
use exabrowse_core::ChannelStore;
use owo_colors::OwoColorize;

pub async fn run(cli: &Cli, action: Option<ChannelsAction>) -> Result<()> {
    let store = ChannelStore::new_default();
    match action.unwrap_or(ChannelsAction::List) {
        ChannelsAction::List => {
            let tables = store.list_all();
            if matches!(cli.output, OutputFormat::Pretty) && !cli.no_color {
                print!("{}", format_channel_tables(&tables));
                println!(
                    "{} {}",
                    "User tables:".dimmed(),
                    store.path().display().dimmed()
                );
                Ok(())
            } else {
                emit(cli, &OutputData::ChannelTables(tables))
            }
        }
        ChannelsAction::Show { table } => {
            let table = find_table(&table)?;
            if matches!(cli.output, OutputFormat::Pretty) && !cli.no_color {
                print!("{}", format_channel_table(&table));
                Ok(())
            } else {
                emit(cli, &OutputData::ChannelTables(vec![table]))
            }
        }
        ChannelsAction::Remove { table } => {
            if store.delete(&table)? {
                println!("{} Removed table {}", "Success!".green().bold(), table.cyan());
            } else {
                println!("{} is not a user-defined table", table.yellow());
            }
            Ok(())
        }
    }
}
