//! Protocol scenarios shared by the in-memory and Redis test suites.
//!
//! Every scenario prefixes its feature and account names with `ns`, so runs
//! against a shared server do not collide in the global set. Scenarios that
//! launch a feature globally revoke it again before returning.

use launchparty_features::*;

pub fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}

/// A ∈ FeatureAccountSet(F) iff F ∈ AccountFeatureSet(A), for every listed
/// feature and account and for every member their sets point at.
pub async fn assert_inverse_index_consistent<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    features: &[String],
    accounts: &[String],
) {
    let store = engine.store();

    for feature in features {
        for account in store.set_members(&engine.feature_key(feature)).await.unwrap() {
            let listed = store
                .set_is_member(&engine.account_key(&account), feature)
                .await
                .unwrap();
            assert!(
                listed,
                "{} lists {} but the account set lacks the feature",
                engine.feature_key(feature),
                account
            );
        }
    }

    for account in accounts {
        for feature in store.set_members(&engine.account_key(account)).await.unwrap() {
            let indexed = store
                .set_is_member(&engine.feature_key(&feature), account)
                .await
                .unwrap();
            assert!(
                indexed,
                "{} has {} but the feature index does not list it",
                engine.account_key(account),
                feature
            );
        }
    }
}

async fn members<S: FeatureStore>(engine: &FeatureStateEngine<S>, key: &str) -> Vec<String> {
    sorted(engine.store().set_members(key).await.unwrap())
}

pub async fn launch_then_query<S: FeatureStore>(engine: &FeatureStateEngine<S>, ns: &str) {
    let feature = format!("{ns}feature7004");
    let account = format!("{ns}account9004");

    engine
        .launch_feature_for_account(&feature, &account)
        .await
        .unwrap();

    assert!(
        engine
            .is_feature_launched_for_account(&feature, &account)
            .await
            .unwrap()
    );
    assert_eq!(
        engine
            .accounts_where_feature_is_launched(&feature)
            .await
            .unwrap(),
        vec![account.clone()]
    );
    assert_inverse_index_consistent(engine, &[feature], &[account]).await;
}

pub async fn launch_is_idempotent<S: FeatureStore>(engine: &FeatureStateEngine<S>, ns: &str) {
    let feature = format!("{ns}f");
    let account = format!("{ns}a");

    engine
        .launch_feature_for_account(&feature, &account)
        .await
        .unwrap();
    engine
        .launch_feature_for_account(&feature, &account)
        .await
        .unwrap();

    assert_eq!(
        members(engine, &engine.account_key(&account)).await,
        vec![feature.clone()]
    );
    assert_eq!(
        members(engine, &engine.feature_key(&feature)).await,
        vec![account.clone()]
    );
    assert_inverse_index_consistent(engine, &[feature], &[account]).await;
}

pub async fn revoke_undoes_launch<S: FeatureStore>(engine: &FeatureStateEngine<S>, ns: &str) {
    let feature = format!("{ns}feature7011");
    let account = format!("{ns}account9008");

    engine
        .launch_feature_for_account(&feature, &account)
        .await
        .unwrap();
    engine
        .revoke_feature_from_account(&feature, &account)
        .await
        .unwrap();

    assert!(
        !engine
            .is_feature_launched_for_account(&feature, &account)
            .await
            .unwrap()
    );
    assert!(
        engine
            .accounts_where_feature_is_launched(&feature)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(members(engine, &engine.account_key(&account)).await.is_empty());
    assert!(members(engine, &engine.feature_key(&feature)).await.is_empty());
}

pub async fn revoke_absent_feature_is_noop<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let feature = format!("{ns}never");
    let account = format!("{ns}launched");

    engine
        .revoke_feature_from_account(&feature, &account)
        .await
        .unwrap();
    let cleaned = engine
        .revoke_feature_from_all_accounts(&feature, RevokeMode::CleanupAccounts)
        .await
        .unwrap();

    assert_eq!(cleaned, 0);
    assert!(members(engine, &engine.account_key(&account)).await.is_empty());
    assert!(members(engine, &engine.feature_key(&feature)).await.is_empty());
}

pub async fn global_override<S: FeatureStore>(engine: &FeatureStateEngine<S>, ns: &str) {
    let feature = format!("{ns}feature70044");

    engine.launch_feature_for_all_accounts(&feature).await.unwrap();

    for account in [format!("{ns}account90044"), format!("{ns}someone-else"), String::new()] {
        assert!(
            engine
                .is_feature_launched_for_account(&feature, &account)
                .await
                .unwrap()
        );
    }
    assert!(
        engine
            .is_feature_launched_for_all_accounts(&feature)
            .await
            .unwrap()
    );

    engine
        .revoke_feature_from_all_accounts(&feature, RevokeMode::GlobalOnly)
        .await
        .unwrap();
}

pub async fn global_launch_keeps_account_membership<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let feature = format!("{ns}feature7002");
    let account = format!("{ns}account9002");

    engine
        .launch_feature_for_account(&feature, &account)
        .await
        .unwrap();
    engine.launch_feature_for_all_accounts(&feature).await.unwrap();

    let in_account = engine
        .store()
        .set_is_member(&engine.account_key(&account), &feature)
        .await
        .unwrap();
    assert!(in_account);
    assert!(
        engine
            .is_feature_launched_for_all_accounts(&feature)
            .await
            .unwrap()
    );
    assert_inverse_index_consistent(engine, &[feature.clone()], &[account]).await;

    engine
        .revoke_feature_from_all_accounts(&feature, RevokeMode::CleanupAccounts)
        .await
        .unwrap();
}

pub async fn cleanup_revoke<S: FeatureStore>(engine: &FeatureStateEngine<S>, ns: &str) {
    let feature = format!("{ns}feature7013");
    let other = format!("{ns}other");
    let accounts: Vec<String> = ["account9010", "account9011", "account9012"]
        .iter()
        .map(|account| format!("{ns}{account}"))
        .collect();

    for account in &accounts {
        engine
            .launch_feature_for_account(&feature, account)
            .await
            .unwrap();
    }
    engine
        .launch_feature_for_account(&other, &accounts[0])
        .await
        .unwrap();
    engine.launch_feature_for_all_accounts(&feature).await.unwrap();

    let cleaned = engine
        .revoke_feature_from_all_accounts(&feature, true)
        .await
        .unwrap();
    assert_eq!(cleaned, 3);

    assert!(
        !engine
            .is_feature_launched_for_all_accounts(&feature)
            .await
            .unwrap()
    );
    for account in &accounts {
        assert!(
            !engine
                .is_feature_launched_for_account(&feature, account)
                .await
                .unwrap()
        );
    }
    assert!(members(engine, &engine.feature_key(&feature)).await.is_empty());

    let remaining = engine
        .features_launched_for_account(&accounts[0])
        .await
        .unwrap();
    assert!(remaining.contains(&other));
    assert!(!remaining.contains(&feature));

    assert_inverse_index_consistent(engine, &[feature, other], &accounts).await;
}

pub async fn non_cleanup_revoke<S: FeatureStore>(engine: &FeatureStateEngine<S>, ns: &str) {
    let feature = format!("{ns}feature7012");
    let account = format!("{ns}account9009");

    engine
        .launch_feature_for_account(&feature, &account)
        .await
        .unwrap();
    engine.launch_feature_for_all_accounts(&feature).await.unwrap();

    let cleaned = engine
        .revoke_feature_from_all_accounts(&feature, RevokeMode::GlobalOnly)
        .await
        .unwrap();
    assert_eq!(cleaned, 0);

    assert!(
        !engine
            .is_feature_launched_for_all_accounts(&feature)
            .await
            .unwrap()
    );
    assert!(
        engine
            .is_feature_launched_for_account(&feature, &account)
            .await
            .unwrap()
    );
    assert_eq!(
        engine
            .accounts_where_feature_is_launched(&feature)
            .await
            .unwrap(),
        vec![account.clone()]
    );
    assert_inverse_index_consistent(engine, &[feature], &[account]).await;
}

pub async fn accounts_where_feature_is_launched_scenario<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let feature = format!("{ns}feat-A");
    let account = format!("{ns}acc-1");

    engine
        .launch_feature_for_account(&feature, &account)
        .await
        .unwrap();
    assert_eq!(
        engine
            .accounts_where_feature_is_launched(&feature)
            .await
            .unwrap(),
        vec![account.clone()]
    );

    engine.launch_feature_for_all_accounts(&feature).await.unwrap();
    assert_eq!(
        engine
            .accounts_where_feature_is_launched(&feature)
            .await
            .unwrap(),
        vec![WILDCARD_ACCOUNT]
    );
    assert!(engine.launched_accounts(&feature).await.unwrap().is_all());

    engine
        .revoke_feature_from_all_accounts(&feature, RevokeMode::CleanupAccounts)
        .await
        .unwrap();
}

pub async fn accounts_where_feature_is_launched_lists_all<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let feature = format!("{ns}feature7005");
    let first = format!("{ns}account9005");
    let second = format!("{ns}account9006");

    engine
        .launch_feature_for_account(&feature, &first)
        .await
        .unwrap();
    engine
        .launch_feature_for_account(&feature, &second)
        .await
        .unwrap();

    let accounts = engine
        .accounts_where_feature_is_launched(&feature)
        .await
        .unwrap();
    assert_eq!(sorted(accounts), vec![first, second]);
}

/// An account with no features of its own sees exactly the global set.
pub async fn empty_account_sees_only_global_features<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let features = engine
        .features_launched_for_account(&format!("{ns}acc-2"))
        .await
        .unwrap();
    let global = engine.features_launched_for_all_accounts().await.unwrap();
    assert_eq!(sorted(features), sorted(global));
}

pub async fn features_launched_for_account_unions_global<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let account = format!("{ns}account9007");
    let own = [format!("{ns}feature7007"), format!("{ns}feature7008")];
    let global = format!("{ns}feature7009");

    for feature in &own {
        engine
            .launch_feature_for_account(feature, &account)
            .await
            .unwrap();
    }
    engine.launch_feature_for_all_accounts(&global).await.unwrap();

    let features = engine
        .features_launched_for_account(&account)
        .await
        .unwrap();
    for feature in own.iter().chain([&global]) {
        assert!(features.contains(feature), "missing {}", feature);
    }

    engine
        .revoke_feature_from_all_accounts(&global, RevokeMode::GlobalOnly)
        .await
        .unwrap();
}

pub async fn features_launched_for_all_accounts<S: FeatureStore>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let first = format!("{ns}feature7014");
    let second = format!("{ns}feature7015");
    let individual = format!("{ns}feature7016");

    engine.launch_feature_for_all_accounts(&first).await.unwrap();
    engine.launch_feature_for_all_accounts(&second).await.unwrap();
    engine
        .launch_feature_for_account(&individual, &format!("{ns}account1"))
        .await
        .unwrap();

    let features = engine.features_launched_for_all_accounts().await.unwrap();
    assert!(features.contains(&first));
    assert!(features.contains(&second));
    assert!(!features.contains(&individual));
    assert!(
        !engine
            .is_feature_launched_for_all_accounts(&individual)
            .await
            .unwrap()
    );

    for feature in [&first, &second] {
        engine
            .revoke_feature_from_all_accounts(feature, RevokeMode::GlobalOnly)
            .await
            .unwrap();
    }
}

pub async fn concurrent_mutations_keep_index_consistent<S: FeatureStore + 'static>(
    engine: &FeatureStateEngine<S>,
    ns: &str,
) {
    let features: Vec<String> = (0..5).map(|i| format!("{ns}feature-{i}")).collect();
    let accounts: Vec<String> = (0..7).map(|i| format!("{ns}account-{i}")).collect();

    let mut tasks = Vec::new();
    for worker in 0..8 {
        let engine = engine.clone();
        let features = features.clone();
        let accounts = accounts.clone();
        tasks.push(tokio::spawn(async move {
            for i in 0..50 {
                let feature = &features[i % 5];
                let account = &accounts[(worker + i) % 7];
                match i % 4 {
                    0 | 1 => engine
                        .launch_feature_for_account(feature, account)
                        .await
                        .unwrap(),
                    2 => engine
                        .revoke_feature_from_account(feature, account)
                        .await
                        .unwrap(),
                    _ => {
                        engine.launch_feature_for_all_accounts(feature).await.unwrap();
                        engine
                            .revoke_feature_from_all_accounts(feature, RevokeMode::CleanupAccounts)
                            .await
                            .unwrap();
                    }
                }
            }
        }));
    }

    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }

    assert_inverse_index_consistent(engine, &features, &accounts).await;

    for feature in &features {
        engine
            .revoke_feature_from_all_accounts(feature, RevokeMode::CleanupAccounts)
            .await
            .unwrap();
    }
}
