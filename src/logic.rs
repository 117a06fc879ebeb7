//! The battle orchestrator: owns rosters, random streams, effects and the
//! turn life cycle.

use crate::actions::{self, Action};
use crate::ai::BattleAI;
use crate::battle_info::BattleInfo;
use crate::battle_logger::{battler_ident, BattleLogger};
use crate::battler::{Battler, BattlerId};
use crate::effects::{Effect, EffectKind, EffectsHandler, Scope};
use crate::env::BattleEnv;
use crate::handlers::battle_end::BattleEndReport;
use crate::hooks::{self, HookRegistry};
use crate::rng::{RandomStreams, RngSeeds, Stream};
use crate::scene::{HeadlessScene, Scene, Visual};
use phf::phf_set;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Fled,
    Caught,
    Draw,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Loading,
    AcceptingActions,
    Executing,
    EndOfTurn,
    Resolution,
    Ended,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwitchRequest {
    pub who: BattlerId,
    /// Chosen replacement; `None` asks the bank's decision source.
    pub with: Option<BattlerId>,
}

/// Abilities whose effect also covers the holder's allies.
static AFFECTS_ALLIES: phf::Set<&'static str> = phf_set! {
    "flowerveil",
    "friendguard",
    "aromaveil",
    "sweetveil",
    "pastelveil",
};

pub struct Logic {
    info: BattleInfo,
    battlers: Vec<Vec<Battler>>,
    env: BattleEnv,
    rng: RandomStreams,
    effects: EffectsHandler,
    hooks: Arc<HookRegistry>,
    scene: Box<dyn Scene>,
    logger: BattleLogger,
    ais: Vec<Option<Box<dyn BattleAI>>>,
    /// Execution stack; the last element runs next.
    actions: Vec<Action>,
    actions_sorted: bool,
    switching: Vec<BattlerId>,
    switch_requests: Vec<SwitchRequest>,
    exp_requests: Vec<BattlerId>,
    evolve_requests: Vec<BattlerId>,
    battle_result: Option<BattleOutcome>,
    /// Ends the battle at the next check, whatever its state.
    pub debug_end_of_battle: bool,
    turn: u32,
    flee_attempts: u32,
    mega_used: Vec<bool>,
    caught: Option<BattlerId>,
    phase: Phase,
}

impl Logic {
    pub fn new(
        info: BattleInfo,
        hooks: Arc<HookRegistry>,
        scene: Box<dyn Scene>,
        seeds: RngSeeds,
    ) -> anyhow::Result<Self> {
        info.validate()?;
        let battlers = load_battlers(&info)?;
        let banks = battlers.len();
        let env = info.env.clone();
        let mut logic = Self {
            logger: BattleLogger::new(info.battle_id),
            info,
            battlers,
            env,
            rng: RandomStreams::new(seeds),
            effects: EffectsHandler::new(),
            hooks,
            scene,
            ais: (0..banks).map(|_| None).collect(),
            actions: Vec::new(),
            actions_sorted: false,
            switching: Vec::new(),
            switch_requests: Vec::new(),
            exp_requests: Vec::new(),
            evolve_requests: Vec::new(),
            battle_result: None,
            debug_end_of_battle: false,
            turn: 0,
            flee_attempts: 0,
            mega_used: vec![false; banks],
            caught: None,
            phase: Phase::Loading,
        };
        logic.effects.set_weather(logic.env.weather, None);
        logic.effects.set_field_terrain(logic.env.field_terrain, None);
        Ok(logic)
    }

    /// Headless battle using the built-in rule pack.
    pub fn with_defaults(info: BattleInfo, seed: u64) -> anyhow::Result<Self> {
        Self::new(
            info,
            hooks::default_hooks(),
            Box::new(HeadlessScene::new()),
            RngSeeds::from_master(seed),
        )
    }

    pub fn info(&self) -> &BattleInfo {
        &self.info
    }

    /// Bags and trainer data; rosters were built at load and are not affected.
    pub fn info_mut(&mut self) -> &mut BattleInfo {
        &mut self.info
    }

    pub fn env(&self) -> &BattleEnv {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut BattleEnv {
        &mut self.env
    }

    pub fn effects(&self) -> &EffectsHandler {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectsHandler {
        &mut self.effects
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    pub fn logger(&self) -> &BattleLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut BattleLogger {
        &mut self.logger
    }

    pub fn rng_mut(&mut self) -> &mut RandomStreams {
        &mut self.rng
    }

    pub fn rng_seeds(&self) -> RngSeeds {
        self.rng.seeds()
    }

    /// Re-seeds all four streams, e.g. to replay a recorded battle.
    pub fn load_rng(&mut self, seeds: RngSeeds) {
        self.rng = RandomStreams::new(seeds);
    }

    pub fn visual(&mut self) -> &mut dyn Visual {
        self.scene.visual()
    }

    pub fn scene_mut(&mut self) -> &mut dyn Scene {
        self.scene.as_mut()
    }

    pub fn display_message(&mut self, text: &str) {
        self.logger.log_message(text);
        self.scene.display_message(text);
    }

    /// Completed end-of-turn sweeps.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn battle_result(&self) -> Option<BattleOutcome> {
        self.battle_result
    }

    pub fn set_battle_result(&mut self, outcome: BattleOutcome) {
        self.battle_result = Some(outcome);
    }

    pub fn is_over(&self) -> bool {
        self.battle_result.is_some() || self.debug_end_of_battle
    }

    pub fn caught(&self) -> Option<BattlerId> {
        self.caught
    }

    pub(crate) fn set_caught(&mut self, id: BattlerId) {
        self.caught = Some(id);
    }

    pub fn flee_attempts(&self) -> u32 {
        self.flee_attempts
    }

    pub(crate) fn count_flee_attempt(&mut self) {
        self.flee_attempts += 1;
    }

    pub fn set_ai(&mut self, bank: usize, ai: Box<dyn BattleAI>) {
        self.ais[bank] = Some(ai);
    }

    // ---- rosters ----

    /// Panics on an id that does not belong to this battle.
    pub fn get(&self, id: BattlerId) -> &Battler {
        &self.battlers[id.bank][id.index]
    }

    /// Like [`Logic::get`], for ids that come from outside and may not exist.
    pub fn try_get(&self, id: BattlerId) -> Option<&Battler> {
        self.battlers.get(id.bank)?.get(id.index)
    }

    pub fn get_mut(&mut self, id: BattlerId) -> &mut Battler {
        &mut self.battlers[id.bank][id.index]
    }

    pub fn bank_count(&self) -> usize {
        self.battlers.len()
    }

    /// Battler on the field at a slot.
    pub fn battler(&self, bank: usize, position: usize) -> Option<&Battler> {
        self.battlers
            .get(bank)?
            .iter()
            .find(|b| b.position == Some(position))
    }

    /// Number of field slots of a bank.
    pub fn battler_count(&self, bank: usize) -> usize {
        if bank < self.battlers.len() {
            self.info.vs_type
        } else {
            0
        }
    }

    pub fn roster(&self, bank: usize) -> &[Battler] {
        &self.battlers[bank]
    }

    /// Every battler of every bank, on the field or not.
    pub fn every_battler(&self) -> impl Iterator<Item = &Battler> {
        self.battlers.iter().flatten()
    }

    /// Battlers on the field, dead or alive.
    pub fn all_battlers(&self) -> impl Iterator<Item = &Battler> {
        self.every_battler().filter(|b| b.on_field())
    }

    pub(crate) fn all_battlers_mut(&mut self) -> impl Iterator<Item = &mut Battler> {
        self.battlers.iter_mut().flatten().filter(|b| b.on_field())
    }

    pub fn all_alive_battlers(&self) -> impl Iterator<Item = &Battler> {
        self.all_battlers().filter(|b| b.alive())
    }

    pub fn foes_of(&self, id: BattlerId) -> Vec<BattlerId> {
        self.all_alive_battlers()
            .filter(|b| b.id.bank != id.bank)
            .map(|b| b.id)
            .collect()
    }

    pub fn allies_of(&self, id: BattlerId) -> Vec<BattlerId> {
        self.all_alive_battlers()
            .filter(|b| b.id.bank == id.bank && b.id != id)
            .map(|b| b.id)
            .collect()
    }

    pub fn adjacent_foes_of(&self, id: BattlerId) -> Vec<BattlerId> {
        let Some(position) = self.get(id).position else {
            return Vec::new();
        };
        self.all_alive_battlers()
            .filter(|b| b.id.bank != id.bank)
            .filter(|b| b.position.is_some_and(|p| p.abs_diff(position) <= 1))
            .map(|b| b.id)
            .collect()
    }

    pub fn adjacent_allies_of(&self, id: BattlerId) -> Vec<BattlerId> {
        let Some(position) = self.get(id).position else {
            return Vec::new();
        };
        self.all_alive_battlers()
            .filter(|b| b.id.bank == id.bank)
            .filter(|b| b.position.is_some_and(|p| p.abs_diff(position) == 1))
            .map(|b| b.id)
            .collect()
    }

    /// Alive battlers of the same bank waiting off the field.
    pub fn reserves(&self, id: BattlerId) -> Vec<BattlerId> {
        self.battlers[id.bank]
            .iter()
            .filter(|b| b.alive() && !b.on_field() && b.id != id)
            .filter(|b| !self.switch_requests.iter().any(|r| r.with == Some(b.id)))
            .map(|b| b.id)
            .collect()
    }

    pub fn has_reserve(&self, id: BattlerId) -> bool {
        !self.reserves(id).is_empty()
    }

    pub fn ident(&self, id: BattlerId) -> String {
        let battler = self.get(id);
        battler_ident(id.bank, battler.position, &battler.name)
    }

    pub(crate) fn register_encounters(&mut self, id: BattlerId) {
        for foe in self.foes_of(id) {
            self.get_mut(id).add_encountered(foe);
            self.get_mut(foe).add_encountered(id);
        }
        if id.bank != 0 {
            let species = self.get(id).species.clone();
            self.env.seen_species.insert(species);
        }
    }

    // ---- effects ----

    /// Visits the effects relevant to `battlers`: global, weather, terrain,
    /// then per battler its ability, item, own and slot effects, then the
    /// ability of allies covering them, then each bank. The first `Some` wins.
    pub fn each_effects<T>(&self, battlers: &[BattlerId], mut f: impl FnMut(&Effect) -> Option<T>) -> Option<T> {
        for effect in self.effects.in_scope(Scope::Global) {
            if let Some(found) = f(effect) {
                return Some(found);
            }
        }
        for effect in [self.effects.weather(), self.effects.field_terrain()].into_iter().flatten() {
            if let Some(found) = f(effect) {
                return Some(found);
            }
        }
        let mut distinct: Vec<BattlerId> = Vec::with_capacity(battlers.len());
        for &id in battlers {
            if distinct.contains(&id) {
                continue;
            }
            distinct.push(id);
            let battler = self.get(id);
            for effect in [battler.ability_effect.as_ref(), battler.item_effect.as_ref()].into_iter().flatten() {
                if let Some(found) = f(effect) {
                    return Some(found);
                }
            }
            for effect in self.effects.in_scope(Scope::Battler(id)) {
                if let Some(found) = f(effect) {
                    return Some(found);
                }
            }
            if let Some(position) = battler.position {
                let slot = Scope::Position {
                    bank: id.bank,
                    position,
                };
                for effect in self.effects.in_scope(slot) {
                    if let Some(found) = f(effect) {
                        return Some(found);
                    }
                }
            }
        }
        let mut covering: Vec<BattlerId> = Vec::new();
        for &id in &distinct {
            for ally in self.allies_of(id) {
                if distinct.contains(&ally) || covering.contains(&ally) {
                    continue;
                }
                let ally_battler = self.get(ally);
                if !AFFECTS_ALLIES.contains(ally_battler.ability.as_str()) {
                    continue;
                }
                covering.push(ally);
                if let Some(effect) = ally_battler.ability_effect.as_ref() {
                    if let Some(found) = f(effect) {
                        return Some(found);
                    }
                }
            }
        }
        let mut banks: Vec<usize> = Vec::new();
        for id in &distinct {
            if banks.contains(&id.bank) {
                continue;
            }
            banks.push(id.bank);
            for effect in self.effects.in_scope(Scope::Bank(id.bank)) {
                if let Some(found) = f(effect) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Whether any effect visited for `battlers` is of `kind`.
    pub fn has_effect(&self, battlers: &[BattlerId], kind: &EffectKind) -> bool {
        self.each_effects(battlers, |e| e.is(kind).then_some(())).is_some()
    }

    pub fn trick_room(&self) -> bool {
        self.effects.has(Scope::Global, &EffectKind::TrickRoom)
    }

    pub fn effective_speed(&self, id: BattlerId) -> u32 {
        actions::effective_speed(self, id)
    }

    // ---- requests ----

    pub fn is_switching(&self, id: BattlerId) -> bool {
        self.switching.contains(&id)
    }

    pub(crate) fn remove_switching(&mut self, id: BattlerId) {
        self.switching.retain(|s| *s != id);
    }

    pub(crate) fn set_switching(&mut self, ids: Vec<BattlerId>) {
        self.switching = ids;
    }

    /// Queues a switch for the end-of-turn flush; one request per battler.
    pub fn request_switch(&mut self, who: BattlerId, with: Option<BattlerId>) {
        if self.switch_requests.iter().any(|r| r.who == who) {
            return;
        }
        self.switch_requests.push(SwitchRequest { who, with });
    }

    pub fn switch_requests(&self) -> &[SwitchRequest] {
        &self.switch_requests
    }

    pub fn request_exp(&mut self, fainted: BattlerId) {
        if !self.exp_requests.contains(&fainted) {
            self.exp_requests.push(fainted);
        }
    }

    pub fn request_evolve(&mut self, id: BattlerId) {
        if !self.evolve_requests.contains(&id) {
            self.evolve_requests.push(id);
        }
    }

    pub fn evolve_requests(&self) -> &[BattlerId] {
        &self.evolve_requests
    }

    pub fn mega_used(&self, bank: usize) -> bool {
        self.mega_used.get(bank).copied().unwrap_or(true)
    }

    pub(crate) fn mark_mega_used(&mut self, bank: usize) {
        self.mega_used[bank] = true;
    }

    /// Picks who replaces `who`: its bank's AI if it has one and answers with
    /// a valid reserve, otherwise a random reserve.
    pub fn choose_replacement(&mut self, who: BattlerId) -> Option<BattlerId> {
        let reserves = self.reserves(who);
        if reserves.is_empty() {
            return None;
        }
        if let Some(mut ai) = self.ais[who.bank].take() {
            let choice = ai.choose_replacement(self, who);
            self.ais[who.bank] = Some(ai);
            if let Some(choice) = choice.filter(|c| reserves.contains(c)) {
                return Some(choice);
            }
        }
        let pick = self.rng.rand(Stream::Generic, reserves.len() as u32) as usize;
        Some(reserves[pick])
    }

    /// Asks every bank's AI for this turn's actions.
    pub fn collect_ai_actions(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        for bank in 0..self.ais.len() {
            if let Some(mut ai) = self.ais[bank].take() {
                actions.extend(ai.choose_actions(self, bank));
                self.ais[bank] = Some(ai);
            }
        }
        actions
    }

    pub fn bag_count(&self, user: BattlerId, item: &str) -> u32 {
        let party = self.get(user).party_id;
        self.info
            .bags
            .get(user.bank)
            .and_then(|bags| bags.get(party))
            .and_then(|bag| bag.get(&crate::normalize_id(item)))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn take_from_bag(&mut self, user: BattlerId, item: &str) -> bool {
        let party = self.get(user).party_id;
        let id = crate::normalize_id(item);
        let Some(count) = self
            .info
            .bags
            .get_mut(user.bank)
            .and_then(|bags| bags.get_mut(party))
            .and_then(|bag| bag.get_mut(&id))
        else {
            return false;
        };
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    // ---- ordering ----

    /// `a` acts before `b` this turn. Dead battlers are never ordered.
    pub fn attack_before(&self, a: BattlerId, b: BattlerId) -> bool {
        let (first, second) = (self.get(a), self.get(b));
        if first.dead() || second.dead() {
            return false;
        }
        match (first.attack_order, second.attack_order) {
            (Some(x), Some(y)) => x < y,
            (Some(_), None) => true,
            _ => false,
        }
    }

    pub fn attack_after(&self, a: BattlerId, b: BattlerId) -> bool {
        self.attack_before(b, a)
    }

    // ---- life cycle ----

    /// Decides whether the battle goes on, recording the result when it does not.
    pub fn can_battle_continue(&mut self) -> bool {
        if self.is_over() {
            return false;
        }
        let party: Vec<&Battler> = self.battlers[0].iter().filter(|b| b.from_party).collect();
        if !party.is_empty() && party.iter().all(|b| b.dead()) && !self.env.ai_can_win {
            self.battle_result = Some(BattleOutcome::Defeat);
            return false;
        }
        let alive_banks: Vec<usize> = (0..self.battlers.len())
            .filter(|&bank| self.battlers[bank].iter().any(Battler::alive))
            .collect();
        if alive_banks.len() > 1 {
            return true;
        }
        self.battle_result = Some(match alive_banks.first() {
            Some(0) => BattleOutcome::Victory,
            Some(_) => BattleOutcome::Defeat,
            None => BattleOutcome::Draw,
        });
        false
    }

    /// Sends every pre-placed battler in, then runs entrance abilities in speed order.
    pub fn battle_phase_start(&mut self) {
        let entering: Vec<BattlerId> = self.all_battlers().map(|b| b.id).collect();
        for &id in &entering {
            self.switch_handler().execute_switch(None, id, true);
        }
        let mut by_speed = entering;
        by_speed.sort_by_key(|id| std::cmp::Reverse(self.effective_speed(*id)));
        for id in by_speed {
            self.ability_change_handler().on_entry(id);
        }
        self.logger.log_turn(self.turn + 1);
        self.phase = Phase::AcceptingActions;
    }

    /// Queues the valid actions and returns how many were accepted.
    pub fn add_actions(&mut self, actions: Vec<Action>) -> usize {
        if self.actions_sorted {
            return 0;
        }
        let before = self.actions.len();
        for action in actions {
            if action.valid(self) {
                self.actions.push(action);
            } else {
                tracing::debug!(?action, "invalid action dropped");
            }
        }
        self.actions.len() - before
    }

    /// Orders the turn's actions; only the first call of a turn does anything.
    pub fn sort_actions(&mut self) {
        if self.actions_sorted {
            return;
        }
        let submitted = std::mem::take(&mut self.actions);
        let mut order = actions::sort(self, submitted);
        for battler in self.battlers.iter_mut().flatten() {
            battler.attack_order = None;
        }
        let mut rank = 0;
        for action in &order {
            if let Action::Attack(attack) = action {
                let battler = &mut self.battlers[attack.launcher.bank][attack.launcher.index];
                if battler.alive() && battler.on_field() && battler.attack_order.is_none() {
                    battler.attack_order = Some(rank);
                    rank += 1;
                }
            }
        }
        tracing::debug!(?order, "actions sorted");
        order.reverse();
        self.actions = order;
        self.actions_sorted = true;
        self.phase = Phase::Executing;
    }

    /// Actions still to run, next one last.
    pub fn pending_actions(&self) -> &[Action] {
        &self.actions
    }

    /// Pushes an action that runs next.
    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Runs the next action; false once the stack is drained or the battle ended.
    pub fn perform_next_action(&mut self) -> bool {
        if !self.can_battle_continue() {
            self.actions.clear();
            return false;
        }
        let Some(action) = self.actions.pop() else {
            return false;
        };
        actions::execute(self, action);
        true
    }

    pub fn battle_phase_end_turn(&mut self) {
        self.phase = Phase::EndOfTurn;
        self.actions.clear();
        self.end_turn_handler().process();
        self.actions_sorted = false;
        self.switching.clear();
        self.phase = Phase::Resolution;
        if self.can_battle_continue() {
            self.logger.log_turn(self.turn + 1);
            self.phase = Phase::AcceptingActions;
        } else {
            self.phase = Phase::Ended;
        }
    }

    /// Flushes the pending switch requests.
    pub fn battle_phase_switch(&mut self) {
        let requests = std::mem::take(&mut self.switch_requests);
        tracing::debug!(count = requests.len(), "flushing switch requests");
        for request in requests {
            if !self.get(request.who).on_field() {
                continue;
            }
            let with = match request.with.filter(|w| {
                let b = self.get(*w);
                b.alive() && !b.on_field() && w.bank == request.who.bank
            }) {
                Some(with) => Some(with),
                None => self.choose_replacement(request.who),
            };
            if let Some(with) = with {
                self.switch_handler().execute_switch(Some(request.who), with, false);
            }
        }
    }

    /// Flushes the pending experience distributions.
    pub fn battle_phase_exp(&mut self) {
        let fainted = std::mem::take(&mut self.exp_requests);
        tracing::debug!(count = fainted.len(), "flushing exp requests");
        for id in fainted {
            self.exp_handler().distribute(id);
        }
    }

    pub fn battle_phase_end(&mut self) -> BattleEndReport {
        if self.battle_result.is_none() {
            self.can_battle_continue();
        }
        match self.battle_result {
            Some(BattleOutcome::Victory) => self.logger.log_win(&self.info.names[0].first().cloned().unwrap_or_default()),
            Some(BattleOutcome::Defeat) => {
                let winner = self.info.names.get(1).and_then(|n| n.first()).cloned().unwrap_or_default();
                self.logger.log_win(&winner);
            }
            Some(BattleOutcome::Draw) | None => self.logger.log_tie(),
            _ => {}
        }
        self.phase = Phase::Ended;
        self.battle_end_handler().process()
    }

    pub(crate) fn advance_turn(&mut self) {
        self.turn += 1;
    }
}

fn load_battlers(info: &BattleInfo) -> anyhow::Result<Vec<Vec<Battler>>> {
    let mut banks = Vec::with_capacity(info.parties.len());
    for (bank, parties) in info.parties.iter().enumerate() {
        let mut roster = Vec::new();
        let mut first_of_party = Vec::with_capacity(parties.len());
        for (party_id, party) in parties.iter().enumerate() {
            first_of_party.push(roster.len());
            for creature in party {
                let id = BattlerId::new(bank, roster.len());
                let from_party = bank == 0 && party_id == 0;
                roster.push(Battler::from_creature(id, party_id, creature.clone(), from_party)?);
            }
        }
        assign_positions(&mut roster, parties.len(), info.vs_type);
        banks.push(roster);
    }
    Ok(banks)
}

/// Slot `p` is filled from party `p % parties`, falling back to any party.
fn assign_positions(roster: &mut [Battler], parties: usize, vs_type: usize) {
    for position in 0..vs_type {
        let wanted = position % parties.max(1);
        let pick = roster
            .iter()
            .position(|b| b.party_id == wanted && b.alive() && b.position.is_none())
            .or_else(|| roster.iter().position(|b| b.alive() && b.position.is_none()));
        if let Some(index) = pick {
            roster[index].position = Some(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logic_with, onix, pikachu};

    #[test]
    fn positions_interleave_parties() {
        let mut info = BattleInfo::wild(vec![pikachu(), pikachu()], onix());
        info.parties[0].push(vec![onix()]);
        info.names[0].push("Ally".to_string());
        info.classes[0].push("Trainer".to_string());
        info.parties[1][0].push(onix());
        info.vs_type = 2;
        let logic = Logic::with_defaults(info, 1).unwrap();
        assert_eq!(logic.battler(0, 0).map(|b| b.party_id), Some(0));
        assert_eq!(logic.battler(0, 1).map(|b| b.party_id), Some(1));
        assert!(!logic.battler(0, 1).unwrap().from_party);
        assert_eq!(logic.battler_count(0), 2);
    }

    #[test]
    fn switch_requests_are_deduplicated() {
        let mut logic = logic_with(vec![pikachu(), onix()], vec![onix()]);
        let who = BattlerId::new(0, 0);
        logic.request_switch(who, None);
        logic.request_switch(who, Some(BattlerId::new(0, 1)));
        assert_eq!(logic.switch_requests().len(), 1);
        logic.battle_phase_switch();
        assert!(logic.switch_requests().is_empty());
        assert_eq!(logic.battler(0, 0).map(|b| b.id), Some(BattlerId::new(0, 1)));
    }

    #[test]
    fn nobody_alive_is_a_draw() {
        let mut logic = logic_with(vec![pikachu()], vec![onix()]);
        logic.get_mut(BattlerId::new(0, 0)).hp = 0;
        logic.get_mut(BattlerId::new(1, 0)).hp = 0;
        logic.env_mut().ai_can_win = true;
        assert!(!logic.can_battle_continue());
        assert_eq!(logic.battle_result(), Some(BattleOutcome::Draw));
    }

    #[test]
    fn player_wipe_is_a_defeat() {
        let mut logic = logic_with(vec![pikachu()], vec![onix()]);
        logic.get_mut(BattlerId::new(0, 0)).hp = 0;
        assert!(!logic.can_battle_continue());
        assert_eq!(logic.battle_result(), Some(BattleOutcome::Defeat));
    }

    #[test]
    fn dead_battlers_are_never_ordered() {
        let mut logic = logic_with(vec![pikachu()], vec![onix()]);
        let (a, b) = (BattlerId::new(0, 0), BattlerId::new(1, 0));
        logic.get_mut(a).attack_order = Some(0);
        logic.get_mut(b).attack_order = Some(1);
        assert!(logic.attack_before(a, b));
        assert!(logic.attack_after(b, a));
        logic.get_mut(b).hp = 0;
        assert!(!logic.attack_before(a, b));
        assert!(!logic.attack_after(b, a));
    }

    #[test]
    fn each_effects_visits_global_before_bank() {
        let mut logic = logic_with(vec![pikachu()], vec![onix()]);
        let id = BattlerId::new(0, 0);
        logic
            .effects_mut()
            .add(Effect::new(EffectKind::Reflect, Scope::Bank(0), 5));
        logic
            .effects_mut()
            .add(Effect::new(EffectKind::TrickRoom, Scope::Global, 5));
        logic.effects_mut().add(Effect::new(
            EffectKind::Focus,
            Scope::Position {
                bank: 0,
                position: 0,
            },
            1,
        ));
        let mut seen = Vec::new();
        let found: Option<()> = logic.each_effects(&[id, id], |effect| {
            seen.push(effect.kind.clone());
            None
        });
        assert!(found.is_none());
        assert_eq!(seen.first(), Some(&EffectKind::TrickRoom));
        assert_eq!(seen.last(), Some(&EffectKind::Reflect));
        assert!(seen.contains(&EffectKind::Focus));
        assert_eq!(seen.iter().filter(|k| matches!(k, EffectKind::Ability(_))).count(), 1);
    }
}
