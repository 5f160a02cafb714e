//! Text commands driving a game session.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use comfy_table::{ContentArrangement, Table};
use thiserror::Error;

use bob_core::{BobError, GameSession};
use bob_sync::{RowKey, SyncError, SyncRow, SyncStatus, SyncWorker};

/// Errors reported back to the player without ending the game.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The game refused the action.
    #[error("{0}")]
    Game(#[from] BobError),

    /// The remote sheet could not be reached.
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// The command was malformed.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// The command is not known.
    #[error("unknown command: {0} (try 'help')")]
    Unknown(String),

    /// Writing an export failed.
    #[error("cannot write {path}: {source}")]
    Io {
        /// Target file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Serializing an export failed.
    #[error("cannot serialize ledger: {0}")]
    Json(#[from] serde_json::Error),
}

type ConsoleResult<T> = Result<T, ConsoleError>;

/// A game session plus its optional remote mirror.
pub struct Console {
    session: GameSession,
    sync: Option<SyncWorker>,
    reported: BTreeSet<RowKey>,
    download_path: PathBuf,
}

impl Console {
    /// Wrap a session. `download_path` is where `download` writes by default.
    pub fn new(session: GameSession, sync: Option<SyncWorker>, download_path: PathBuf) -> Self {
        Self {
            session,
            sync,
            reported: BTreeSet::new(),
            download_path,
        }
    }

    /// The underlying session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The remote mirror, if configured.
    pub fn sync(&self) -> Option<&SyncWorker> {
        self.sync.as_ref()
    }

    /// Stop the sync worker, waiting for queued rows, and summarize.
    pub fn close(&mut self) -> Option<String> {
        let statuses = self.sync.take()?.shutdown();
        if statuses.is_empty() {
            return None;
        }
        Some(summarize(&statuses))
    }

    /// Run one command line and return what to show.
    pub fn process(&mut self, input: &str) -> ConsoleResult<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }

        let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (trimmed.to_lowercase(), ""),
        };

        let output = match cmd.as_str() {
            "start" => self.do_start(rest),
            "cards" => self.do_cards(),
            "story" => self.do_story(rest),
            "characters" | "chars" => self.do_characters(rest),
            "edit" => self.do_edit(),
            "players" => self.do_player_options(rest),
            "puppets" => self.do_puppet_options(rest),
            "player" => self.do_assign(rest, Pool::Player),
            "puppet" => self.do_assign(rest, Pool::Puppet),
            "order" => self.do_order(rest),
            "notes" => self.do_notes(rest),
            "finish" => self.do_finish(),
            "abort" => self.do_abort(),
            "ledger" => Ok(self.do_ledger()),
            "download" => self.do_download(rest),
            "sync" => Ok(self.do_sync_status()),
            "retry" => self.do_retry(),
            "status" => Ok(self.do_status()),
            "reset" => Ok(self.do_reset()),
            "help" => Ok(HELP.to_string()),
            "quit" | "q" => Ok("Goodbye!".to_string()),
            other => Err(ConsoleError::Unknown(other.to_string())),
        }?;

        Ok(match self.new_sync_failures() {
            Some(warning) if output.is_empty() => warning,
            Some(warning) => format!("{output}\n{warning}"),
            None => output,
        })
    }

    fn do_start(&mut self, rest: &str) -> ConsoleResult<String> {
        if rest.is_empty() {
            return Err(ConsoleError::Usage("start <name>, <name>, <name>..."));
        }
        let roster = self.session.start_game(rest)?;
        let names = roster.players().join(", ");
        let mut out = format!("Game started with {} players: {names}\n\n", roster.len());
        out.push_str(&self.round_banner());
        Ok(out)
    }

    fn do_cards(&self) -> ConsoleResult<String> {
        match self.session.draw() {
            Some(_) => Ok(self.round_banner()),
            None => Err(BobError::WrongPhase {
                action: "show cards",
                actual: self.session.phase(),
            }
            .into()),
        }
    }

    fn do_story(&mut self, rest: &str) -> ConsoleResult<String> {
        if rest.is_empty() {
            return Err(ConsoleError::Usage("story <text>"));
        }
        self.session.write_story(rest)?;
        Ok("Story recorded.".to_string())
    }

    fn do_characters(&mut self, rest: &str) -> ConsoleResult<String> {
        let assignment = self.session.advance_to_assignment(rest.split(','))?;
        let names = assignment.characters().joined();
        Ok(format!(
            "Characters: {names}\nAssign each one with 'player <character> = <player>' \
             and 'puppet <character> = <puppet>'."
        ))
    }

    fn do_edit(&mut self) -> ConsoleResult<String> {
        self.session.reopen_writing()?;
        Ok("Back to writing. Name the characters again when ready.".to_string())
    }

    fn do_player_options(&self, character: &str) -> ConsoleResult<String> {
        if character.is_empty() {
            return Err(ConsoleError::Usage("players <character>"));
        }
        let options = self.session.player_candidates(character)?;
        Ok(format!("Players open to {character}: {}", options.join(", ")))
    }

    fn do_puppet_options(&self, character: &str) -> ConsoleResult<String> {
        if character.is_empty() {
            return Err(ConsoleError::Usage("puppets <character>"));
        }
        let options = self.session.puppet_candidates(character)?;
        Ok(format!("Puppets open to {character}: {}", options.join(", ")))
    }

    fn do_assign(&mut self, rest: &str, pool: Pool) -> ConsoleResult<String> {
        let Some((character, choice)) = rest.split_once('=') else {
            return Err(ConsoleError::Usage(match pool {
                Pool::Player => "player <character> = <player>",
                Pool::Puppet => "puppet <character> = <puppet>",
            }));
        };
        let (character, choice) = (character.trim(), choice.trim());
        match pool {
            Pool::Player => self.session.assign_player(character, choice)?,
            Pool::Puppet => self.session.assign_puppet(character, choice)?,
        }
        let done = self
            .session
            .assignment()
            .is_some_and(|a| a.is_complete());
        let mut out = format!("{character} -> {choice}");
        if done {
            out.push_str("\nEveryone is cast. Type 'finish' to save the round.");
        }
        Ok(out)
    }

    fn do_order(&mut self, rest: &str) -> ConsoleResult<String> {
        let Some((players, puppets)) = rest.split_once('/') else {
            return Err(ConsoleError::Usage(
                "order <player>, <player>... / <puppet>, <puppet>...",
            ));
        };
        let split = |list: &str| -> Vec<String> {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };
        let (players, puppets) = (split(players), split(puppets));
        self.session
            .assign_in_order(players.as_slice(), puppets.as_slice())?;
        Ok(self.cast_summary())
    }

    fn do_notes(&mut self, rest: &str) -> ConsoleResult<String> {
        self.session.set_notes(rest)?;
        Ok("Notes recorded.".to_string())
    }

    fn do_finish(&mut self) -> ConsoleResult<String> {
        let record = self.session.finish_round()?;
        let mut out = format!("Round {} saved.", record.number);

        if let Some(worker) = &self.sync {
            let row = SyncRow::from_record(
                self.session.game_number(),
                self.session.ledger(),
                &record,
            );
            match worker.submit(row) {
                Ok(()) => out.push_str(&format!(" Sending to {}...", worker.sink_name())),
                Err(e) => {
                    self.reported.insert(row_key(&self.session, record.number));
                    out.push_str(&format!("\nwarning: round {} not synced: {e}", record.number));
                }
            }
        }

        out.push_str("\n\n");
        out.push_str(&self.round_banner());
        Ok(out)
    }

    fn do_abort(&mut self) -> ConsoleResult<String> {
        self.session.abort_round()?;
        Ok(format!("Round discarded.\n\n{}", self.round_banner()))
    }

    fn do_ledger(&self) -> String {
        let ledger = self.session.ledger();
        if ledger.is_empty() {
            return "No rounds finished yet.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Round", "Emotion", "Characters", "Cast"]);
        let puppets = self.session.catalog().puppets();
        for record in ledger.records() {
            let cast: Vec<String> = puppets
                .iter()
                .zip(&record.puppet_columns)
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(puppet, cell)| format!("{puppet}: {cell}"))
                .collect();
            table.add_row(vec![
                record.number.to_string(),
                record.emotion.clone(),
                record.characters_joined(),
                cast.join("\n"),
            ]);
        }
        format!("{table}\n  {} rounds", ledger.len())
    }

    fn do_download(&self, rest: &str) -> ConsoleResult<String> {
        let ledger = self.session.ledger();
        if ledger.is_empty() {
            return Ok("Nothing to export yet. Finish a round first.".to_string());
        }

        let path = if rest.is_empty() {
            self.download_path.clone()
        } else {
            PathBuf::from(rest)
        };
        let content = if is_json(&path) {
            ledger.to_json()?
        } else {
            ledger.export().to_csv()
        };
        std::fs::write(&path, content).map_err(|source| ConsoleError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(format!("Exported {} rounds to {}", ledger.len(), path.display()))
    }

    fn do_sync_status(&self) -> String {
        let Some(worker) = &self.sync else {
            return "Remote sync is not configured.".to_string();
        };
        let statuses = worker.statuses();
        if statuses.is_empty() {
            return format!("Nothing sent to {} yet.", worker.sink_name());
        }
        let mut out = format!("Sync to {}:\n", worker.sink_name());
        for (key, status) in &statuses {
            out.push_str(&format!("  {}: {status}\n", self.describe(*key)));
        }
        out.push_str(&summarize(&statuses));
        out
    }

    fn do_retry(&mut self) -> ConsoleResult<String> {
        let Some(worker) = &self.sync else {
            return Ok("Remote sync is not configured.".to_string());
        };
        let failed: Vec<RowKey> = worker
            .statuses()
            .into_iter()
            .filter(|(_, status)| matches!(status, SyncStatus::Failed(_)))
            .map(|(key, _)| key)
            .collect();
        let count = worker.retry_failed()?;
        for key in &failed {
            self.reported.remove(key);
        }
        Ok(format!("Retrying {count} rounds."))
    }

    fn do_status(&self) -> String {
        let s = &self.session;
        let Some(roster) = s.roster() else {
            return "No game in progress. Start one with 'start <names>'.".to_string();
        };
        let mut out = format!("Players: {}\n", roster.players().join(", "));
        out.push_str(&format!("Round {}: {}\n", s.round_number(), s.phase()));
        if let Some(characters) = s.characters() {
            out.push_str(&format!("Characters: {}\n", characters.joined()));
            out.push_str(&self.cast_summary());
            out.push('\n');
        }
        out.push_str(&format!("Finished rounds: {}", s.ledger().len()));
        if let Some(worker) = &self.sync {
            out.push_str(&format!("\nSync pending: {}", worker.pending()));
        }
        out
    }

    fn do_reset(&mut self) -> String {
        self.session.reset();
        "Game reset. Start a new one with 'start <names>'.".to_string()
    }

    fn round_banner(&self) -> String {
        let s = &self.session;
        match s.draw() {
            Some(draw) => format!("--- Round {} ---\n{draw}", s.round_number()),
            None => String::new(),
        }
    }

    fn cast_summary(&self) -> String {
        let s = &self.session;
        let (Some(assignment), Some(roster)) = (s.assignment(), s.roster()) else {
            return String::new();
        };
        let puppets = s.catalog().puppets();
        let lines: Vec<String> = assignment
            .characters()
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let player = assignment.player_of(i).and_then(|p| roster.name(p));
                let puppet = assignment.puppet_of(i).map(|p| puppets[p].as_str());
                format!(
                    "  {name}: {} / {}",
                    player.unwrap_or("?"),
                    puppet.unwrap_or("?")
                )
            })
            .collect();
        lines.join("\n")
    }

    /// "Round N" for the current game, "Game G round N" for earlier ones.
    fn describe(&self, key: RowKey) -> String {
        if key.game == self.session.game_number() {
            format!("Round {}", key.round)
        } else {
            format!("Game {} round {}", key.game, key.round)
        }
    }

    /// Warnings for rounds that failed to sync since the last report.
    fn new_sync_failures(&mut self) -> Option<String> {
        let worker = self.sync.as_ref()?;
        let mut warnings = Vec::new();
        for (key, status) in worker.statuses() {
            if let SyncStatus::Failed(e) = status
                && self.reported.insert(key)
            {
                warnings.push(format!(
                    "warning: {} not synced: {e} (saved locally; 'retry' to resend)",
                    self.describe(key).to_lowercase()
                ));
            }
        }
        (!warnings.is_empty()).then(|| warnings.join("\n"))
    }
}

#[derive(Clone, Copy)]
enum Pool {
    Player,
    Puppet,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Key of round `round` in the session's current game.
fn row_key(session: &GameSession, round: u32) -> RowKey {
    RowKey::new(session.game_number(), round)
}

fn summarize(statuses: &[(RowKey, SyncStatus)]) -> String {
    let synced = statuses
        .iter()
        .filter(|(_, s)| *s == SyncStatus::Synced)
        .count();
    let failed = statuses
        .iter()
        .filter(|(_, s)| matches!(s, SyncStatus::Failed(_)))
        .count();
    let pending = statuses.len() - synced - failed;
    format!("Sync: {synced} synced, {failed} failed, {pending} pending")
}

const HELP: &str = "\
Game Commands:
  start <names>                     Start a game (3-8 players, comma-separated)
  cards                             Show this round's emotion and prompt
  story <text>                      Write or rewrite the story
  characters <name>, <name>...      Name 2 to N characters, then assign them
  edit                              Go back and rename the characters
  players <character>               List players still open to a character
  puppets <character>               List puppets still open to a character
  player <character> = <player>     Give a character to a player
  puppet <character> = <puppet>     Give a character a puppet
  order <players> / <puppets>       Assign both lists in character order
  notes <text>                      Add notes to the round
  finish                            Save the round and draw new cards
  abort                             Discard the round and draw new cards
  ledger                            Show finished rounds
  download [path]                   Export rounds (CSV, or JSON for .json)
  sync                              Show remote sync status
  retry                             Resend rounds that failed to sync
  status                            Show game status
  reset                             End the game
  help                              Show this help
  quit                              Exit";

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bob_core::{GameConfig, Phase};
    use bob_sync::{RoundSink, SyncResult};

    struct RefusingSink;

    impl RoundSink for RefusingSink {
        fn name(&self) -> &str {
            "locked-sheet"
        }

        fn append(&mut self, _row: &SyncRow) -> SyncResult<()> {
            Err(SyncError::Unauthorized("HTTP 401".to_string()))
        }
    }

    fn console(sync: Option<SyncWorker>) -> Console {
        let session = GameSession::new(GameConfig::default().with_seed(3)).unwrap();
        Console::new(session, sync, PathBuf::from("game_data.csv"))
    }

    fn play_round(c: &mut Console) -> String {
        c.process("story The dragon ate my homework").unwrap();
        c.process("characters Hero, Villain").unwrap();
        c.process("player Hero = Ann").unwrap();
        c.process("player Villain = Bo").unwrap();
        c.process("puppet Hero = Taylor").unwrap();
        let out = c.process("puppet Villain = Fade").unwrap();
        assert!(out.contains("Everyone is cast"));
        c.process("finish").unwrap()
    }

    #[test]
    fn start_shows_cards() {
        let mut c = console(None);
        let out = c.process("start Ann, Bo, Cid").unwrap();
        assert!(out.contains("3 players"));
        assert!(out.contains("--- Round 1 ---"));
        assert!(out.contains("Emotion:"));
        assert!(out.contains("Prompt:"));
    }

    #[test]
    fn full_round() {
        let mut c = console(None);
        c.process("start Ann, Bo, Cid").unwrap();
        play_round(&mut c);
        let ledger = c.session().ledger();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].puppet_columns[0], "Ann - Hero");
        assert_eq!(c.session().round_number(), 2);
        assert!(c.process("ledger").unwrap().contains("Taylor: Ann - Hero"));
    }

    #[test]
    fn single_character_is_refused() {
        let mut c = console(None);
        c.process("start Ann, Bo, Cid").unwrap();
        let err = c.process("characters Hero").unwrap_err();
        assert!(err.to_string().contains("between 2 and 3"));
        assert_eq!(c.session().phase(), Phase::Writing);
    }

    #[test]
    fn order_assigns_everyone() {
        let mut c = console(None);
        c.process("start Ann, Bo, Cid").unwrap();
        c.process("characters Hero, Villain").unwrap();
        let out = c.process("order Cid, Ann / Zizi, Nahas").unwrap();
        assert!(out.contains("Hero: Cid / Zizi"));
        assert!(out.contains("Villain: Ann / Nahas"));
        c.process("finish").unwrap();
        assert_eq!(c.session().ledger().len(), 1);
    }

    #[test]
    fn usage_errors() {
        let mut c = console(None);
        assert!(matches!(c.process("start"), Err(ConsoleError::Usage(_))));
        c.process("start Ann, Bo, Cid").unwrap();
        c.process("characters Hero, Villain").unwrap();
        assert!(matches!(c.process("player Hero Ann"), Err(ConsoleError::Usage(_))));
        assert!(matches!(c.process("dance"), Err(ConsoleError::Unknown(_))));
    }

    #[test]
    fn download_before_first_round() {
        let mut c = console(None);
        c.process("start Ann, Bo, Cid").unwrap();
        assert!(c.process("download").unwrap().contains("Nothing to export yet"));
    }

    #[test]
    fn download_writes_csv_and_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut c = console(None);
        c.process("start Ann, Bo, Cid").unwrap();
        play_round(&mut c);

        let csv_path = dir.path().join("rounds.csv");
        c.process(&format!("download {}", csv_path.display())).unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Emotion,Prompt,Story,Characters,Notes,Taylor,Fade"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Hero, Villain\",,Ann - Hero,Bo - Villain,,"));

        let json_path = dir.path().join("rounds.json");
        c.process(&format!("download {}", json_path.display())).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json[0]["number"], 1);
    }

    #[test]
    fn refused_sync_keeps_local_round() {
        let worker = SyncWorker::spawn(Box::new(RefusingSink));
        let mut c = console(Some(worker));
        c.process("start Ann, Bo, Cid").unwrap();
        let finished = play_round(&mut c);

        assert_eq!(c.session().ledger().len(), 1);
        assert_eq!(c.session().round_number(), 2);

        assert!(c.sync().unwrap().flush(Duration::from_secs(5)));
        let later = c.process("cards").unwrap();
        let warnings = format!("{finished}\n{later}")
            .matches("warning: round 1 not synced")
            .count();
        assert_eq!(warnings, 1);
        assert!(!c.process("cards").unwrap().contains("warning"));
        assert!(c.process("sync").unwrap().contains("0 synced, 1 failed"));

        let summary = c.close().unwrap();
        assert!(summary.contains("1 failed"));
    }

    #[test]
    fn new_game_keeps_old_failures_retryable() {
        let worker = SyncWorker::spawn(Box::new(RefusingSink));
        let mut c = console(Some(worker));
        c.process("start Ann, Bo, Cid").unwrap();
        play_round(&mut c);
        assert!(c.sync().unwrap().flush(Duration::from_secs(5)));
        assert!(c.process("status").unwrap().contains("Finished rounds: 1"));

        let restart = c.process("start Dee, Eve, Fay").unwrap();
        assert!(!restart.contains("warning"));
        c.process("story Second game").unwrap();
        c.process("characters Hero, Villain").unwrap();
        c.process("order Dee, Eve / Taylor, Fade").unwrap();
        let finished = c.process("finish").unwrap();
        assert!(c.sync().unwrap().flush(Duration::from_secs(5)));

        let later = format!("{finished}\n{}", c.process("cards").unwrap());
        assert_eq!(later.matches("warning: round 1 not synced").count(), 1);
        assert!(!later.contains("game 1 round 1"));

        let sync = c.process("sync").unwrap();
        assert!(sync.contains("Game 1 round 1: failed"));
        assert!(sync.contains("Round 1: failed"));
        assert!(sync.contains("0 synced, 2 failed"));

        let retried = c.process("retry").unwrap();
        assert!(retried.starts_with("Retrying 2 rounds."));
        assert!(c.sync().unwrap().flush(Duration::from_secs(5)));
        let again = format!("{retried}\n{}", c.process("cards").unwrap());
        assert!(again.contains("warning: game 1 round 1 not synced"));
        assert!(again.contains("warning: round 1 not synced"));
    }

    #[test]
    fn reset_and_status() {
        let mut c = console(None);
        assert!(c.process("status").unwrap().contains("No game in progress"));
        c.process("start Ann, Bo, Cid").unwrap();
        assert!(c.process("status").unwrap().contains("Round 1: drawing cards"));
        c.process("reset").unwrap();
        assert_eq!(c.session().phase(), Phase::AwaitingRoster);
        assert!(c.process("cards").is_err());
    }
}
