//! 設備路徑標準化

use cv_core::{EquipmentPath, Machine, MachineId, PathToken};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

/// 設備路徑標準化器
///
/// 將一組設備ID收斂為群組感知的標準路徑，並計算最壞情況表面積。
pub struct PathNormalizer<'a> {
    machines: HashMap<MachineId, &'a Machine>,
}

impl<'a> PathNormalizer<'a> {
    /// 以設備登記資料建立
    pub fn new(machines: &'a [Machine]) -> Self {
        Self {
            machines: machines.iter().map(|m| (m.id, m)).collect(),
        }
    }

    /// 查找設備
    pub fn machine(&self, id: MachineId) -> Option<&'a Machine> {
        self.machines.get(&id).copied()
    }

    /// 標準化設備集合
    ///
    /// 先將ID排序去重，未分組設備成為 `machine:<id>`，
    /// 同群組設備在第一次遇到時收斂為單一 `group:<name>`。
    /// 未登記的設備視為未分組。
    pub fn normalize<'b, I>(&self, machine_ids: I) -> EquipmentPath
    where
        I: IntoIterator<Item = &'b MachineId>,
    {
        let ids: BTreeSet<MachineId> = machine_ids.into_iter().copied().collect();
        let mut seen_groups: BTreeSet<&str> = BTreeSet::new();
        let mut tokens = Vec::with_capacity(ids.len());

        for id in ids {
            match self.machine(id).and_then(Machine::group_tag) {
                Some(group) => {
                    if seen_groups.insert(group) {
                        tokens.push(PathToken::Group(group.to_string()));
                    }
                }
                None => tokens.push(PathToken::Machine(id)),
            }
        }

        EquipmentPath::from_tokens(tokens)
    }

    /// 最壞情況表面積
    ///
    /// 依標準路徑加總：未分組設備計入自身面積，每個群組只計入其代表設備的面積。
    pub fn worst_case_area<'b, I>(&self, machine_ids: I) -> Decimal
    where
        I: IntoIterator<Item = &'b MachineId>,
    {
        let ids: BTreeSet<MachineId> = machine_ids.into_iter().copied().collect();

        self.normalize(&ids)
            .tokens()
            .iter()
            .filter_map(|token| match token {
                PathToken::Machine(id) => self.machine(*id),
                PathToken::Group(group) => self.representative(group, &ids),
            })
            .map(Machine::area)
            .sum()
    }

    /// 各設備表面積的單純加總
    pub fn total_area<'b, I>(&self, machine_ids: I) -> Decimal
    where
        I: IntoIterator<Item = &'b MachineId>,
    {
        let ids: BTreeSet<MachineId> = machine_ids.into_iter().copied().collect();
        ids.into_iter()
            .filter_map(|id| self.machine(id))
            .map(Machine::area)
            .sum()
    }

    /// 群組的代表設備（表面積最大者，同面積取ID較小者）
    pub fn representative<'b, I>(&self, group: &str, machine_ids: I) -> Option<&'a Machine>
    where
        I: IntoIterator<Item = &'b MachineId>,
    {
        let ids: BTreeSet<MachineId> = machine_ids.into_iter().copied().collect();
        let mut best: Option<&'a Machine> = None;

        for machine in ids.into_iter().filter_map(|id| self.machine(id)) {
            if machine.group_tag() != Some(group) {
                continue;
            }
            if best.map_or(true, |b| machine.area() > b.area()) {
                best = Some(machine);
            }
        }

        best
    }

    /// 未登記的設備ID
    pub fn unknown_machines<'b, I>(&self, machine_ids: I) -> Vec<MachineId>
    where
        I: IntoIterator<Item = &'b MachineId>,
    {
        let ids: BTreeSet<MachineId> = machine_ids.into_iter().copied().collect();
        ids.into_iter()
            .filter(|id| !self.machines.contains_key(id))
            .collect()
    }

    /// 設備集合涉及的生產線（依字典序）
    pub fn lines<'b, I>(&self, machine_ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'b MachineId>,
    {
        machine_ids
            .into_iter()
            .filter_map(|id| self.machine(*id))
            .map(|m| m.line.clone())
            .collect()
    }

    /// 設備集合所屬生產線：ID最小的已登記設備的生產線
    pub fn line_of<'b, I>(&self, machine_ids: I) -> Option<String>
    where
        I: IntoIterator<Item = &'b MachineId>,
    {
        let ids: BTreeSet<MachineId> = machine_ids.into_iter().copied().collect();
        ids.into_iter()
            .find_map(|id| self.machine(id))
            .map(|m| m.line.clone())
    }
}
