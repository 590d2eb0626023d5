//! Host-name expansion.
//!
//! Cluster-local hosts have three equivalent spellings: the fully-qualified
//! form (`svc.ns.svc.cluster.local`) and the two short forms (`svc.ns.svc`,
//! `svc.ns`). A virtual host must match all spellings a client might use, so
//! every host set is expanded before it reaches a route table.

/// Expands `hosts` with their cluster-domain short forms.
///
/// For each of the suffixes `""`, `".{cluster_domain}"` and
/// `".svc.{cluster_domain}"`, a host ending with that suffix contributes the
/// host minus the suffix. Order-preserving and deduplicated, which makes the
/// expansion idempotent.
pub fn expand_domains<'a>(
    hosts: impl IntoIterator<Item = &'a str>,
    cluster_domain: &str,
) -> Vec<String> {
    let suffixes = [
        String::new(),
        format!(".{cluster_domain}"),
        format!(".svc.{cluster_domain}"),
    ];

    let mut expanded = Vec::new();
    for host in hosts {
        for suffix in &suffixes {
            if let Some(short) = host.strip_suffix(suffix.as_str()) {
                if !short.is_empty() && !expanded.iter().any(|d| d == short) {
                    expanded.push(short.to_string());
                }
            }
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_hosts_pass_through() {
        assert_eq!(
            expand_domains(["svc.example.com"], "cluster.local"),
            vec!["svc.example.com"],
        );
    }

    #[test]
    fn cluster_local_hosts_gain_short_forms() {
        assert_eq!(
            expand_domains(["foo.default.svc.cluster.local"], "cluster.local"),
            vec![
                "foo.default.svc.cluster.local",
                "foo.default.svc",
                "foo.default",
            ],
        );
    }

    #[test]
    fn expansion_is_idempotent() {
        let hosts = ["foo.default.svc.cluster.local", "svc.example.com"];
        let once = expand_domains(hosts.iter().copied(), "cluster.local");
        let twice = expand_domains(once.iter().map(String::as_str), "cluster.local");
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicates_are_collapsed() {
        assert_eq!(
            expand_domains(
                ["foo.default.svc.cluster.local", "foo.default"],
                "cluster.local"
            ),
            vec![
                "foo.default.svc.cluster.local",
                "foo.default.svc",
                "foo.default",
            ],
        );
    }
}
