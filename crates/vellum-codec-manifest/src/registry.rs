//! 元素注册表：指针与名称到元素的查找视图。
//!
//! # 教案定位（Why）
//! - 引用解析与按名调用都需要反复查找元素；注册表在一次遍历中建好查找表，
//!   后续查找不再线性扫描清单。
//!
//! # 契约说明（What）
//! - 注册表是清单的只读借用视图，构造后不随清单变化（清单本身不可变即无此问题）。
//! - 指针重复时先出现的元素生效；重复指针在编解码边界会被整体性校验拒绝，
//!   注册表自身不报错。

use alloc::collections::BTreeMap;

use crate::model::{Element, ElementBody, Manifest};
use crate::typedesc::TypeField;

/// 清单元素的查找视图。
///
/// ### 实现说明（How）
/// - 底层为有序映射：指针表键为 `u32`，名称表键为借用的 `&str`，均在构造时一次填充。
/// - 名称表按类别分开，例程与类可以同名而互不遮蔽。
#[derive(Debug)]
pub struct ElementRegistry<'m> {
    by_ptr: BTreeMap<u32, &'m Element>,
    routines: BTreeMap<&'m str, u32>,
    events: BTreeMap<&'m str, u32>,
    structures: BTreeMap<&'m str, u32>,
    classes: BTreeMap<&'m str, u32>,
}

impl<'m> ElementRegistry<'m> {
    /// 一次遍历构造全部查找表。
    #[must_use]
    pub fn new(manifest: &'m Manifest) -> Self {
        let mut by_ptr: BTreeMap<u32, &'m Element> = BTreeMap::new();
        let mut routines = BTreeMap::new();
        let mut events = BTreeMap::new();
        let mut structures = BTreeMap::new();
        let mut classes = BTreeMap::new();
        for element in &manifest.elements {
            by_ptr.entry(element.ptr).or_insert(element);
            match &element.body {
                ElementBody::Routine(def) => {
                    routines.entry(def.name.as_str()).or_insert(element.ptr);
                }
                ElementBody::Event(def) => {
                    events.entry(def.name.as_str()).or_insert(element.ptr);
                }
                ElementBody::Structure(def) => {
                    structures.entry(def.name.as_str()).or_insert(element.ptr);
                }
                ElementBody::Class(def) => {
                    classes.entry(def.name.as_str()).or_insert(element.ptr);
                }
                ElementBody::State(_) | ElementBody::Constant(_) => {}
            }
        }
        Self {
            by_ptr,
            routines,
            events,
            structures,
            classes,
        }
    }

    /// 按指针查找元素。
    #[must_use]
    pub fn element(&self, ptr: u32) -> Option<&'m Element> {
        self.by_ptr.get(&ptr).copied()
    }

    /// 按名称查找例程元素。
    #[must_use]
    pub fn routine(&self, name: &str) -> Option<&'m Element> {
        self.lookup(&self.routines, name)
    }

    /// 按名称查找事件元素。
    #[must_use]
    pub fn event(&self, name: &str) -> Option<&'m Element> {
        self.lookup(&self.events, name)
    }

    /// 按名称查找结构元素。
    #[must_use]
    pub fn structure(&self, name: &str) -> Option<&'m Element> {
        self.lookup(&self.structures, name)
    }

    /// 按名称查找类元素。
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&'m Element> {
        self.lookup(&self.classes, name)
    }

    /// 指针指向的元素若具备字段列表形状（结构或类），返回其字段列表。
    #[must_use]
    pub fn shape_fields(&self, ptr: u32) -> Option<&'m [TypeField]> {
        self.element(ptr).and_then(|element| element.body.shape_fields())
    }

    fn lookup(&self, table: &BTreeMap<&'m str, u32>, name: &str) -> Option<&'m Element> {
        table.get(name).and_then(|ptr| self.element(*ptr))
    }
}
