use serde_json::json;

/// Line-oriented record of everything a battle showed, in protocol style
/// (`|turn|3`, `|-damage|p2a: Onix|40/95`, ...).
#[derive(Clone, Debug, Default)]
pub struct BattleLogger {
    battle_id: u32,
    log: Vec<String>,
}

impl BattleLogger {
    pub fn new(battle_id: u32) -> Self {
        Self {
            battle_id,
            log: Vec::new(),
        }
    }

    pub fn log_turn(&mut self, turn: u32) {
        self.log.push(format!("|turn|{turn}"));
    }

    pub fn log_move(&mut self, source: &str, skill_id: &str, target: &str) {
        self.log.push(format!("|move|{source}|{skill_id}|{target}"));
    }

    pub fn log_damage(&mut self, target: &str, hp: u16, max_hp: u16) {
        self.log.push(format!("|-damage|{target}|{hp}/{max_hp}"));
    }

    pub fn log_heal(&mut self, target: &str, hp: u16, max_hp: u16) {
        self.log.push(format!("|-heal|{target}|{hp}/{max_hp}"));
    }

    pub fn log_status(&mut self, target: &str, status: &str) {
        self.log.push(format!("|-status|{target}|{status}"));
    }

    pub fn log_cure(&mut self, target: &str, status: &str) {
        self.log.push(format!("|-curestatus|{target}|{status}"));
    }

    pub fn log_boost(&mut self, target: &str, stat: &str, amount: i8) {
        if amount >= 0 {
            self.log.push(format!("|-boost|{target}|{stat}|{amount}"));
        } else {
            self.log.push(format!("|-unboost|{target}|{stat}|{}", -amount));
        }
    }

    pub fn log_switch(&mut self, ident: &str, species: &str, hp: u16, max_hp: u16) {
        self.log.push(format!("|switch|{ident}|{species}|{hp}/{max_hp}"));
    }

    pub fn log_faint(&mut self, ident: &str) {
        self.log.push(format!("|faint|{ident}"));
    }

    pub fn log_weather(&mut self, weather: &str) {
        self.log.push(format!("|-weather|{weather}"));
    }

    pub fn log_field(&mut self, terrain: &str) {
        self.log.push(format!("|-fieldstart|{terrain}"));
    }

    pub fn log_item(&mut self, ident: &str, item: &str) {
        self.log.push(format!("|-item|{ident}|{item}"));
    }

    pub fn log_ability(&mut self, ident: &str, ability: &str) {
        self.log.push(format!("|-ability|{ident}|{ability}"));
    }

    pub fn log_message(&mut self, message: &str) {
        self.log.push(format!("|-message|{message}"));
    }

    pub fn log_win(&mut self, winner: &str) {
        self.log.push(format!("|win|{winner}"));
    }

    pub fn log_tie(&mut self) {
        self.log.push("|tie|".to_string());
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// Text of every `|-message|` line, in order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.log
            .iter()
            .filter_map(|line| line.strip_prefix("|-message|"))
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "battle_id": self.battle_id,
            "log": self.log,
        })
    }
}

/// `p1a: Pikachu` style identifier; off-field battlers get no slot letter.
pub fn battler_ident(bank: usize, position: Option<usize>, name: &str) -> String {
    let slot = position
        .and_then(|p| (b'a'..=b'z').nth(p))
        .map(|c| (c as char).to_string())
        .unwrap_or_default();
    format!("p{}{slot}: {name}", bank + 1)
}
