//! # `tsa-feed` - 本地缓存的历史行情读取
//!
//! 实现 `tsa-core` 的 `PriceSource` 端口。行情需预先下载到数据目录，
//! 本 crate 不发起任何网络请求。

pub mod json;
