// Wire protocol DTOs and conversions for public game server messages.

use crate::domain::effects::Popup;
use crate::domain::entity::StatPoints;
use crate::domain::snapshot::{
    EntityDetails, EntitySnapshot, ProjectileSnapshot, SwingSnapshot, WorldSnapshot,
};
use crate::domain::{InventoryAction, Item, PlayerInput, SlotRef};
use crate::use_cases::ChatLine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Identity and class, sent once after Join is accepted.
    Init(InitDto),
    // Snapshot of the world for a given tick.
    Snapshot(SnapshotDto),
    Chat(ChatDto),
    Disconnect { id: u64 },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Handshake; must be the first message on the socket.
    Join(JoinPayload),
    Input(InputDto),
    SkillUpgrade(SkillUpgradeDto),
    Inventory(InventoryActionDto),
    Chat(ChatPayload),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitDto {
    pub me_id: u64,
    pub tick_rate: u32,
    pub player_class: &'static str,
}

/// Per-tick input payload sent by the client after joining.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDto {
    pub seq: i64,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    // Missing aim leaves the current aim untouched.
    #[serde(default)]
    pub aim: Option<f32>,
    #[serde(default)]
    pub attack_melee: bool,
    #[serde(default)]
    pub attack_throw: bool,
}

impl From<InputDto> for PlayerInput {
    fn from(input: InputDto) -> Self {
        Self {
            seq: input.seq,
            up: input.up,
            down: input.down,
            left: input.left,
            right: input.right,
            aim: input.aim.unwrap_or(f32::NAN),
            attack_melee: input.attack_melee,
            attack_throw: input.attack_throw,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillUpgradeDto {
    pub stat: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InventoryActionDto {
    SelectHotbar { index: i64 },
    Swap { from: SlotRefDto, to: SlotRefDto },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKindDto {
    Inventory,
    Hotbar,
    Weapon,
    Glyph,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SlotRefDto {
    pub kind: SlotKindDto,
    #[serde(default)]
    pub index: Option<i64>,
}

impl SlotRefDto {
    /// Indexed slots need a non-negative index; bounds are checked by the domain.
    pub fn to_slot(self) -> Option<SlotRef> {
        let index = || self.index.and_then(|i| usize::try_from(i).ok());
        match self.kind {
            SlotKindDto::Inventory => index().map(SlotRef::Inventory),
            SlotKindDto::Hotbar => index().map(SlotRef::Hotbar),
            SlotKindDto::Weapon => Some(SlotRef::Weapon),
            SlotKindDto::Glyph => index().map(SlotRef::Glyph),
        }
    }
}

impl InventoryActionDto {
    pub fn to_action(&self) -> Option<InventoryAction> {
        match *self {
            InventoryActionDto::SelectHotbar { index } => {
                Some(InventoryAction::SelectHotbar { index })
            }
            InventoryActionDto::Swap { from, to } => Some(InventoryAction::Swap {
                from: from.to_slot()?,
                to: to.to_slot()?,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatDto {
    pub id: u64,
    pub text: String,
    pub ts: u64,
}

impl From<&ChatLine> for ChatDto {
    fn from(line: &ChatLine) -> Self {
        Self {
            id: line.player_id.0,
            text: line.text.clone(),
            ts: line.ts,
        }
    }
}

/// Snapshot of the world sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDto {
    pub tick: u64,
    pub time_ms: f64,
    pub entities: BTreeMap<u64, EntityDto>,
    pub projectiles: Vec<ProjectileDto>,
    pub swings: Vec<SwingDto>,
    pub exp_popups: Vec<PopupDto>,
    pub damage_popups: Vec<PopupDto>,
}

impl From<&WorldSnapshot> for SnapshotDto {
    fn from(snap: &WorldSnapshot) -> Self {
        Self {
            tick: snap.tick,
            time_ms: snap.time_ms,
            entities: snap
                .entities
                .iter()
                .map(|(id, e)| (id.0, EntityDto::from(e)))
                .collect(),
            projectiles: snap.projectiles.iter().map(ProjectileDto::from).collect(),
            swings: snap.swings.iter().map(SwingDto::from).collect(),
            exp_popups: snap.exp_popups.iter().map(PopupDto::from).collect(),
            damage_popups: snap.damage_popups.iter().map(PopupDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDto {
    pub id: u64,
    pub kind: &'static str,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub radius: f32,
    pub color: &'static str,
    pub health: f32,
    pub max_health: f32,
    #[serde(flatten)]
    pub details: EntityDetailsDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EntityDetailsDto {
    Player(PlayerDetailsDto),
    Enemy(EnemyDetailsDto),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetailsDto {
    pub class: &'static str,
    pub name: String,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    pub skill_points: u32,
    pub stats: StatsDto,
    pub inventory: Vec<Option<ItemDto>>,
    pub hotbar: Vec<Option<ItemDto>>,
    pub weapon: Option<ItemDto>,
    pub glyphs: Vec<Option<ItemDto>>,
    pub selected_hotbar: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyDetailsDto {
    pub name: String,
    pub level: u32,
    pub behavior: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub health: u32,
    pub damage: u32,
    pub speed: u32,
    pub attack_speed: u32,
}

impl From<StatPoints> for StatsDto {
    fn from(stats: StatPoints) -> Self {
        Self {
            health: stats.health,
            damage: stats.damage,
            speed: stats.speed,
            attack_speed: stats.attack_speed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ItemDto {
    Weapon {
        id: u64,
        name: &'static str,
        weapon_class: &'static str,
        attack_kind: &'static str,
        damage: f32,
        cooldown_ms: f64,
    },
    Glyph {
        id: u64,
        name: &'static str,
        stat: &'static str,
        percent_boost: f32,
    },
}

impl From<&Item> for ItemDto {
    fn from(item: &Item) -> Self {
        match item {
            Item::Weapon(w) => ItemDto::Weapon {
                id: w.id.0,
                name: w.name,
                weapon_class: w.weapon_class.as_str(),
                attack_kind: w.attack_kind.as_str(),
                damage: w.damage,
                cooldown_ms: w.cooldown_ms,
            },
            Item::Glyph(g) => ItemDto::Glyph {
                id: g.id.0,
                name: g.name,
                stat: g.stat.as_str(),
                percent_boost: g.percent_boost,
            },
        }
    }
}

fn slots(items: &[Option<Item>]) -> Vec<Option<ItemDto>> {
    items.iter().map(|slot| slot.as_ref().map(ItemDto::from)).collect()
}

impl From<&EntitySnapshot> for EntityDto {
    fn from(e: &EntitySnapshot) -> Self {
        let (kind, details) = match &e.details {
            EntityDetails::Player(p) => (
                "player",
                EntityDetailsDto::Player(PlayerDetailsDto {
                    class: p.class.as_str(),
                    name: p.name.clone(),
                    level: p.level,
                    exp: p.exp,
                    exp_to_next: p.exp_to_next,
                    skill_points: p.skill_points,
                    stats: p.stats.into(),
                    inventory: slots(&p.inventory),
                    hotbar: slots(&p.hotbar),
                    weapon: p.weapon.as_ref().map(ItemDto::from),
                    glyphs: slots(&p.glyphs),
                    selected_hotbar: p.selected_hotbar,
                }),
            ),
            EntityDetails::Enemy(enemy) => (
                "enemy",
                EntityDetailsDto::Enemy(EnemyDetailsDto {
                    name: enemy.name.clone(),
                    level: enemy.level,
                    behavior: enemy.behavior.as_str(),
                }),
            ),
        };

        Self {
            id: e.id.0,
            kind,
            x: e.pos.x,
            y: e.pos.y,
            angle: e.angle,
            radius: e.radius,
            color: e.color,
            health: e.health,
            max_health: e.max_health,
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileDto {
    pub id: u64,
    pub owner_id: u64,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub angle: f32,
}

impl From<&ProjectileSnapshot> for ProjectileDto {
    fn from(p: &ProjectileSnapshot) -> Self {
        Self {
            id: p.id.0,
            owner_id: p.owner.0,
            x: p.pos.x,
            y: p.pos.y,
            radius: p.radius,
            angle: p.angle,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingDto {
    pub id: u64,
    pub owner_id: u64,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub thickness: f32,
    pub progress: f32,
    pub angle: f32,
}

impl From<&SwingSnapshot> for SwingDto {
    fn from(s: &SwingSnapshot) -> Self {
        Self {
            id: s.id.0,
            owner_id: s.owner.0,
            x1: s.start.x,
            y1: s.start.y,
            x2: s.end.x,
            y2: s.end.y,
            thickness: s.thickness,
            progress: s.progress,
            angle: s.angle,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupDto {
    pub id: u64,
    pub amount: f32,
    pub x: f32,
    pub y: f32,
    pub created_at: f64,
    pub expires_at: f64,
}

impl From<&Popup> for PopupDto {
    fn from(p: &Popup) -> Self {
        Self {
            id: p.subject.0,
            amount: p.amount,
            x: p.pos.x,
            y: p.pos.y,
            created_at: p.created_at,
            expires_at: p.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_defaults_missing_flags_and_aim() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"Input","data":{"seq":3,"up":true}}"#)
                .expect("valid input");
        let ClientMessage::Input(dto) = msg else {
            panic!("expected input");
        };
        let input = PlayerInput::from(dto);
        assert_eq!(input.seq, 3);
        assert!(input.up && !input.down && !input.attack_melee);
        assert!(input.aim.is_nan());
    }

    #[test]
    fn swap_action_parses_slot_refs() {
        let raw = r#"{"type":"Inventory","data":{"action":"swap",
            "from":{"kind":"inventory","index":2},"to":{"kind":"weapon"}}}"#;
        let ClientMessage::Inventory(dto) =
            serde_json::from_str::<ClientMessage>(raw).expect("valid")
        else {
            panic!("expected inventory");
        };
        assert_eq!(
            dto.to_action(),
            Some(InventoryAction::Swap {
                from: SlotRef::Inventory(2),
                to: SlotRef::Weapon,
            })
        );
    }

    #[test]
    fn indexed_slot_without_index_is_rejected() {
        let raw = r#"{"action":"swap","from":{"kind":"glyph"},"to":{"kind":"inventory","index":0}}"#;
        let dto: InventoryActionDto = serde_json::from_str(raw).expect("valid");
        assert_eq!(dto.to_action(), None);
    }

    #[test]
    fn server_messages_use_type_and_data() {
        let json = serde_json::to_value(ServerMessage::Disconnect { id: 7 }).expect("serialize");
        assert_eq!(json["type"], "Disconnect");
        assert_eq!(json["data"]["id"], 7);
    }
}
