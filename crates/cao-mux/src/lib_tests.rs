// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::fake::FakeMuxAdapter;
use crate::MuxAdapter;

#[tokio::test]
async fn adapter_is_object_safe_and_trait_works_through_dyn() {
    let adapter: Box<dyn MuxAdapter> = Box::new(FakeMuxAdapter::new());
    adapter.create("s", "/tmp", &[], &[]).await.unwrap();
    assert!(adapter.exists("s").await.unwrap());
    adapter.kill("s").await.unwrap();
    assert!(!adapter.exists("s").await.unwrap());
}
