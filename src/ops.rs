//! Structural operations on [`Nfa`]s: reversal, reachability and pruning.

use crate::automaton::{Nfa, NfaEdge, State};

/// Reverses every edge and swaps the initial and accepting sets.
pub fn reverse(nfa: &Nfa) -> Nfa {
    let mut rev = Nfa::with_states(nfa.num_states());
    rev.initial = nfa.accepting.clone();
    rev.accepting = nfa.initial.clone();
    for e in nfa.all_edges() {
        rev.edges[e.target].push(NfaEdge {
            source: e.target,
            target: e.source,
            symbol: e.symbol,
        });
    }
    rev
}

/// Returns the sorted list of states reachable from the initial states.
pub fn reachable(nfa: &Nfa) -> Vec<State> {
    reachable_from(nfa, &nfa.initial)
}

/// Returns the sorted list of states reachable from `sources`.
pub fn reachable_from(nfa: &Nfa, sources: &[State]) -> Vec<State> {
    let mut visited = vec![false; nfa.num_states()];
    let mut stack = Vec::new();
    for &s in sources {
        if !visited[s] {
            visited[s] = true;
            stack.push(s);
        }
    }
    while let Some(s) = stack.pop() {
        for e in &nfa.edges[s] {
            if !visited[e.target] {
                visited[e.target] = true;
                stack.push(e.target);
            }
        }
    }
    visited.iter().enumerate().filter(|&(_, &v)| v).map(|(s, _)| s).collect()
}

/// Drops the unreachable states, renumbering the rest by their position in
/// the sorted reachable list.
///
/// Returns the pruned automaton together with the old index of every new
/// state, so that callers can carry per-state metadata along.
pub fn prune_unreachable(nfa: &Nfa) -> (Nfa, Vec<State>) {
    let kept = reachable(nfa);
    let mut renumber = vec![None; nfa.num_states()];
    for (new, &old) in kept.iter().enumerate() {
        renumber[old] = Some(new);
    }

    let remap = |states: &[State]| -> Vec<State> { states.iter().filter_map(|&s| renumber[s]).collect() };

    let mut pruned = Nfa::with_states(kept.len());
    pruned.initial = remap(&nfa.initial);
    pruned.accepting = remap(&nfa.accepting);
    for (new, &old) in kept.iter().enumerate() {
        for e in &nfa.edges[old] {
            if let Some(target) = renumber[e.target] {
                pruned.edges[new].push(NfaEdge {
                    source: new,
                    target,
                    symbol: e.symbol,
                });
            }
        }
    }

    log::debug!("pruned {} of {} states", nfa.num_states() - kept.len(), nfa.num_states());
    (pruned, kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;

    fn sample() -> Nfa {
        // 0 -a-> 1 -b-> 2, 3 -a-> 2 (3 unreachable), 4 isolated
        let mut nfa = Nfa::with_states(5);
        nfa.initial = vec![0];
        nfa.accepting = vec![2, 4];
        nfa.add_edge(0, 1, Symbol::new('a'));
        nfa.add_edge(1, 2, Symbol::new('b'));
        nfa.add_edge(3, 2, Symbol::new('a'));
        nfa
    }

    #[test]
    fn test_reverse() {
        let nfa = sample();
        let rev = reverse(&nfa);
        assert_eq!(rev.initial, vec![2, 4]);
        assert_eq!(rev.accepting, vec![0]);
        assert_eq!(rev.edges[2].len(), 2);
        assert!(rev.edges[1].contains(&NfaEdge {
            source: 1,
            target: 0,
            symbol: Symbol::new('a')
        }));
    }

    #[test]
    fn test_reachable() {
        let nfa = sample();
        assert_eq!(reachable(&nfa), vec![0, 1, 2]);
        assert_eq!(reachable(&reverse(&nfa)), vec![0, 1, 2, 3, 4]);
        assert_eq!(reachable_from(&nfa, &[3]), vec![2, 3]);
    }

    #[test]
    fn test_reachable_empty_initial() {
        let mut nfa = sample();
        nfa.initial.clear();
        assert!(reachable(&nfa).is_empty());
        let (pruned, kept) = prune_unreachable(&nfa);
        assert_eq!(pruned.num_states(), 0);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_prune_unreachable() {
        let nfa = sample();
        let (pruned, kept) = prune_unreachable(&nfa);
        assert_eq!(kept, vec![0, 1, 2]);
        assert_eq!(pruned.num_states(), 3);
        assert_eq!(pruned.initial, vec![0]);
        assert_eq!(pruned.accepting, vec![2]);
        assert_eq!(pruned.num_edges(), 2);

        let (again, kept) = prune_unreachable(&pruned);
        assert_eq!(again, pruned);
        assert_eq!(kept, vec![0, 1, 2]);
    }
}
