// Fixed reachability-test playbook emitted for every probe

/// Pings every host and prints `Host <name> is <reachable|unreachable>`
pub const REACHABILITY_PLAYBOOK: &str = r#"---
- name: Check host connectivity
  hosts: all
  gather_facts: false
  tasks:
    - name: Ping host
      ansible.builtin.ping:
      register: ping_result
      ignore_errors: true
      ignore_unreachable: true

    - name: Report status
      ansible.builtin.debug:
        msg: "Host {{ inventory_hostname }} is {{ 'unreachable' if (ping_result.unreachable | default(false)) or (ping_result.failed | default(false)) else 'reachable' }}"
"#;
