//! School Registry - 学校账号与师生分配存储
//!
//! 基于 SeaORM 的用户与师生分配数据层。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `runtime`: 启动流程（连接数据库、迁移）
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod storage;
pub mod utils;
