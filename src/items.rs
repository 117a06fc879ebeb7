use crate::battler::Stat;
use crate::creature::Status;
use phf::phf_map;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BallKind {
    Poke,
    Great,
    Ultra,
    Master,
    Safari,
    Net,
    Dive,
    Nest,
    Repeat,
    Timer,
    Quick,
    Dusk,
    Level,
    Lure,
    Heavy,
    Fast,
    Premier,
    Snag,
}

impl BallKind {
    /// Only balls built for it can take a trainer's creature.
    pub fn allows_trainer_catch(self) -> bool {
        matches!(self, BallKind::Snag)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeldItem {
    Leftovers,
    BlackSludge,
    FocusSash,
    QuickClaw,
    CustapBerry,
    SmokeBall,
    ShedShell,
    ChoiceScarf,
    IronBall,
    LumBerry,
    SitrusBerry,
    ShellBell,
    Amulet,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ItemKind {
    Ball(BallKind),
    /// Restores a fixed amount; zero means full.
    Heal(u16),
    FullRestore,
    /// Cures one status, or any when `None`.
    StatusCure(Option<Status>),
    XItem(Stat),
    Held(HeldItem),
    MegaStone,
}

#[derive(Clone, Copy, Debug)]
pub struct ItemData {
    pub name: &'static str,
    pub kind: ItemKind,
}

static ITEM_TABLE: phf::Map<&'static str, ItemData> = phf_map! {
    "pokeball" => ItemData { name: "Poké Ball", kind: ItemKind::Ball(BallKind::Poke) },
    "greatball" => ItemData { name: "Great Ball", kind: ItemKind::Ball(BallKind::Great) },
    "ultraball" => ItemData { name: "Ultra Ball", kind: ItemKind::Ball(BallKind::Ultra) },
    "masterball" => ItemData { name: "Master Ball", kind: ItemKind::Ball(BallKind::Master) },
    "safariball" => ItemData { name: "Safari Ball", kind: ItemKind::Ball(BallKind::Safari) },
    "netball" => ItemData { name: "Net Ball", kind: ItemKind::Ball(BallKind::Net) },
    "diveball" => ItemData { name: "Dive Ball", kind: ItemKind::Ball(BallKind::Dive) },
    "nestball" => ItemData { name: "Nest Ball", kind: ItemKind::Ball(BallKind::Nest) },
    "repeatball" => ItemData { name: "Repeat Ball", kind: ItemKind::Ball(BallKind::Repeat) },
    "timerball" => ItemData { name: "Timer Ball", kind: ItemKind::Ball(BallKind::Timer) },
    "quickball" => ItemData { name: "Quick Ball", kind: ItemKind::Ball(BallKind::Quick) },
    "duskball" => ItemData { name: "Dusk Ball", kind: ItemKind::Ball(BallKind::Dusk) },
    "levelball" => ItemData { name: "Level Ball", kind: ItemKind::Ball(BallKind::Level) },
    "lureball" => ItemData { name: "Lure Ball", kind: ItemKind::Ball(BallKind::Lure) },
    "heavyball" => ItemData { name: "Heavy Ball", kind: ItemKind::Ball(BallKind::Heavy) },
    "fastball" => ItemData { name: "Fast Ball", kind: ItemKind::Ball(BallKind::Fast) },
    "premierball" => ItemData { name: "Premier Ball", kind: ItemKind::Ball(BallKind::Premier) },
    "snagball" => ItemData { name: "Snag Ball", kind: ItemKind::Ball(BallKind::Snag) },
    "potion" => ItemData { name: "Potion", kind: ItemKind::Heal(20) },
    "superpotion" => ItemData { name: "Super Potion", kind: ItemKind::Heal(60) },
    "hyperpotion" => ItemData { name: "Hyper Potion", kind: ItemKind::Heal(120) },
    "maxpotion" => ItemData { name: "Max Potion", kind: ItemKind::Heal(0) },
    "fullrestore" => ItemData { name: "Full Restore", kind: ItemKind::FullRestore },
    "antidote" => ItemData { name: "Antidote", kind: ItemKind::StatusCure(Some(Status::Poison)) },
    "paralyzeheal" => ItemData { name: "Paralyze Heal", kind: ItemKind::StatusCure(Some(Status::Paralysis)) },
    "burnheal" => ItemData { name: "Burn Heal", kind: ItemKind::StatusCure(Some(Status::Burn)) },
    "awakening" => ItemData { name: "Awakening", kind: ItemKind::StatusCure(Some(Status::Sleep)) },
    "iceheal" => ItemData { name: "Ice Heal", kind: ItemKind::StatusCure(Some(Status::Freeze)) },
    "fullheal" => ItemData { name: "Full Heal", kind: ItemKind::StatusCure(None) },
    "xattack" => ItemData { name: "X Attack", kind: ItemKind::XItem(Stat::Atk) },
    "xdefense" => ItemData { name: "X Defense", kind: ItemKind::XItem(Stat::Dfe) },
    "xspatk" => ItemData { name: "X Sp. Atk", kind: ItemKind::XItem(Stat::Ats) },
    "xspdef" => ItemData { name: "X Sp. Def", kind: ItemKind::XItem(Stat::Dfs) },
    "xspeed" => ItemData { name: "X Speed", kind: ItemKind::XItem(Stat::Spd) },
    "xaccuracy" => ItemData { name: "X Accuracy", kind: ItemKind::XItem(Stat::Acc) },
    "leftovers" => ItemData { name: "Leftovers", kind: ItemKind::Held(HeldItem::Leftovers) },
    "blacksludge" => ItemData { name: "Black Sludge", kind: ItemKind::Held(HeldItem::BlackSludge) },
    "focussash" => ItemData { name: "Focus Sash", kind: ItemKind::Held(HeldItem::FocusSash) },
    "quickclaw" => ItemData { name: "Quick Claw", kind: ItemKind::Held(HeldItem::QuickClaw) },
    "custapberry" => ItemData { name: "Custap Berry", kind: ItemKind::Held(HeldItem::CustapBerry) },
    "smokeball" => ItemData { name: "Smoke Ball", kind: ItemKind::Held(HeldItem::SmokeBall) },
    "shedshell" => ItemData { name: "Shed Shell", kind: ItemKind::Held(HeldItem::ShedShell) },
    "choicescarf" => ItemData { name: "Choice Scarf", kind: ItemKind::Held(HeldItem::ChoiceScarf) },
    "ironball" => ItemData { name: "Iron Ball", kind: ItemKind::Held(HeldItem::IronBall) },
    "lumberry" => ItemData { name: "Lum Berry", kind: ItemKind::Held(HeldItem::LumBerry) },
    "sitrusberry" => ItemData { name: "Sitrus Berry", kind: ItemKind::Held(HeldItem::SitrusBerry) },
    "shellbell" => ItemData { name: "Shell Bell", kind: ItemKind::Held(HeldItem::ShellBell) },
    "amuletcoin" => ItemData { name: "Amulet Coin", kind: ItemKind::Held(HeldItem::Amulet) },
    "charizarditex" => ItemData { name: "Charizardite X", kind: ItemKind::MegaStone },
    "charizarditey" => ItemData { name: "Charizardite Y", kind: ItemKind::MegaStone },
    "venusaurite" => ItemData { name: "Venusaurite", kind: ItemKind::MegaStone },
    "blastoisinite" => ItemData { name: "Blastoisinite", kind: ItemKind::MegaStone },
    "gengarite" => ItemData { name: "Gengarite", kind: ItemKind::MegaStone },
};

pub fn item(id: &str) -> Option<&'static ItemData> {
    ITEM_TABLE.get(crate::normalize_id(id).as_str())
}

pub fn item_kind(id: &str) -> Option<ItemKind> {
    item(id).map(|data| data.kind)
}

pub fn held_item(id: &str) -> Option<HeldItem> {
    match item_kind(id)? {
        ItemKind::Held(held) => Some(held),
        _ => None,
    }
}

pub fn ball_kind(id: &str) -> Option<BallKind> {
    match item_kind(id)? {
        ItemKind::Ball(ball) => Some(ball),
        _ => None,
    }
}

/// Display name, falling back to the id for items outside the table.
pub fn item_name(id: &str) -> String {
    item(id)
        .map(|data| data.name.to_string())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_normalizes_names() {
        assert_eq!(ball_kind("Ultra Ball"), Some(BallKind::Ultra));
        assert_eq!(held_item("Quick Claw"), Some(HeldItem::QuickClaw));
        assert_eq!(item_kind("X Speed"), Some(ItemKind::XItem(Stat::Spd)));
        assert!(item("rarecandy").is_none());
    }

    #[test]
    fn only_snag_ball_takes_trainer_creatures() {
        assert!(BallKind::Snag.allows_trainer_catch());
        assert!(!BallKind::Master.allows_trainer_catch());
    }
}
