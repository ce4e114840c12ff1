//! Contract interfaces, one per deployed flavour.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct CandidateEntry {
        string name;
        uint256 voteCount;
    }

    /// Many elections, addressed by index.
    interface IMultiElectionVoting {
        function electionCount() external view returns (uint256 count);
        /// Public struct getter; only the leading `title` member is declared.
        function elections(uint256 id) external view returns (string title);
        function isElectionOpen(uint256 id) external view returns (bool open);
        function getCandidates(uint256 id) external view returns (CandidateEntry[] candidates);
        function hasVoted(uint256 id, address voter) external view returns (bool voted);
        function owner() external view returns (address account);

        function createElection(string title) external;
        function addCandidate(uint256 id, string name) external;
        function setElectionStatus(uint256 id, bool open) external;
        function vote(uint256 id, uint256 candidateIndex) external;
    }

    /// One current election, token-backed, candidates addressed by name.
    interface ISingleElectionVoting {
        function votacionActiva() external view returns (bool active);
        function nombreEleccionActual() external view returns (string name);
        function obtenerResultados() external view returns (string[] names, uint256[] votes);
        function balanceOf(address account) external view returns (uint256 balance);
        function owner() external view returns (address account);

        function emitirVoto(string candidate) external;
        function agregarCandidato(string name) external;
        function eliminarCandidato(string name) external;
        function activarVotacion(bool active) external;
        function iniciarNuevaEleccion(string name) external;
        function mint(address to, uint256 amount) external;
        function transferirPropiedad(address newOwner) external;
    }
}
