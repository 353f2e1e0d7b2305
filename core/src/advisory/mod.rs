//! Cloud architecture advisory document
//!
//! A written advisory describing a hypothetical multi-agent
//! cloud-architecture-advisory workflow. This is prose held as string
//! constants and rendered on request; it carries no orchestration
//! logic, no scheduler, and no inter-agent messaging.

/// Section 1: the agent roster and their collaboration.
pub const AGENT_DESIGN: &str = r#"
## AGENT DESIGN

The orchestration uses a **Sequential/Pipeline Pattern** with five specialized agents:

1.  **Requirements Analyst (RA)**
    * **Role:** Decomposes the initial business problem into clear, quantifiable technical needs.
    * **Input:** Problem description (e.g., "Customer Support Chatbot").
    * **Output (JSON):** Functional Requirements (FRs), Non-Functional Requirements (NFRs) including load metrics (`load_conv_day: 500`), latency targets, and compliance requirements.

2.  **Data & Integration Agent (DIA)**
    * **Role:** Focuses on data types, storage strategy, and external system connectivity.
    * **Input:** Output from RA.
    * **Output (JSON):** Data storage recommendations (e.g., `db_type: NoSQL/Vector DB`), PII classification, and integration protocols (e.g., `integration_protocol: Async Queue`).

3.  **Compute & Infrastructure Agent (CIA)**
    * **Role:** Selects the most efficient compute model and infrastructure components based on the load and latency NFRs.
    * **Input:** Output from RA and DIA.
    * **Output (JSON):** Recommended compute model (e.g., `compute_model: Serverless Functions`), networking needs (e.g., API Gateway), and initial resource sizing estimates.

4.  **Security & Isolation Agent (SIA)**
    * **Role:** Designs the security architecture, including authentication, access control, and defense layers.
    * **Input:** Output from RA and DIA (especially PII classification).
    * **Output (JSON):** Required security services (e.g., WAF, Secrets Manager), authentication methods (e.g., OAuth), and compliance measures.

5.  **Resource Cost & Synthesis Agent (RCA)**
    * **Role:** Compiles all preceding outputs, validates the total architecture against NFRs, resolves conflicts, performs final cost estimation, and generates the report.
    * **Input:** Outputs from DIA, CIA, and SIA.
    * **Output:** Final structured architecture report (Markdown) with service list, cost estimate, and justification.
"#;

/// Section 2: an end-to-end walkthrough for one scenario.
pub const WORKFLOW: &str = r#"
## ORCHESTRATION WORKFLOW (Scenario: Customer Support Chatbot)

**Step-by-Step Workflow:**

1.  **Initiation (RA):** The Orchestrator sends the "Customer Support Chatbot" description to the **Requirements Analyst (RA)**. The RA decomposes it into **Load NFRs** (low-to-moderate, bursty, ~500 conv/day) and **Integration FRs** (CRM, Human Handoff).
2.  **Parallel Analysis (DIA, CIA, SIA):** The RA's output is immediately sent to the **Data & Integration Agent (DIA)**, **Compute & Infrastructure Agent (CIA)**, and **Security & Isolation Agent (SIA)**.
    * *CIA Decision:* Based on the bursty load NFR, the CIA selects **Serverless Functions** and **API Gateway**.
    * *DIA Decision:* Based on the integration FRs, the DIA mandates a **Queue Service** for decoupling CRM/Human Handoffs, and a **NoSQL/Vector DB** for scalable chat history.
    * *SIA Decision:* Based on the PII risk, the SIA requires a **WAF** for ingress protection and a **Secrets Manager** for CRM credentials.
3.  **Synthesis and Final Check (RCA):** The **Resource Cost & Synthesis Agent (RCA)** receives all three outputs.
    * **Validation:** RCA confirms the architecture supports all FRs (e.g., the Queue Service satisfies the Human Handoff requirement).
    * **Costing:** RCA estimates the monthly cost based on the chosen services and load NFRs.
4.  **Final Recommendation:** RCA outputs the completed, justified architecture report.

**Failure Handling and Feasibility:**

* **Handling Unclear Output:** If an agent (e.g., CIA) returns malformed JSON or an incomplete field, the Orchestrator runs a **Refinement Loop**. The Orchestrator resends the input to the failing agent along with a clear instruction: "The output was missing the required 'compute\_model' field. Re-run and ensure the JSON schema is strictly followed." This forces compliance before synthesis.
* **Ensuring Feasibility:** The RCA performs a final **Architectural Sanity Check**. It verifies that the combined services do not inherently conflict (e.g., a high-latency DB is not paired with a low-latency NFR). If a conflict exists (e.g., latency is too high), the RCA mediates by adding an appropriate service (like a Caching layer) and adjusting the TCO.
"#;

/// Section 3: concrete service mapping for the walked-through scenario.
pub const RESOURCE_MAPPING: &str = r#"
## CLOUD RESOURCE MAPPING (Scenario: Customer Support Chatbot)

* **Compute:** **Serverless Functions** (e.g., AWS Lambda, Azure Functions)
    * **Justification:** The primary workload is event-driven (a new chat message). Serverless is ideal for **bursty, unpredictable traffic** and scales instantly while minimizing costs when idle.

* **Storage (Primary):** **Managed NoSQL/Vector DB** (e.g., DynamoDB, CosmosDB)
    * **Justification:** Provides the low-latency, high-scalability storage needed for chat logs (key-value access). The Vector index capability is essential for Retrieval-Augmented Generation (RAG) in modern AI chatbots.

* **Storage (Caching):** **In-memory Cache** (e.g., Redis)
    * **Justification:** Reduces latency for frequent state checks and short-term conversation context, helping meet the strict user-facing NFRs.

* **Networking:** **API Gateway**
    * **Justification:** Acts as the single, secured HTTP entry point for the mobile/web UI, providing rate limiting and seamless integration with the Serverless compute and WAF.

* **Integration/Messaging:** **Queue Service** (e.g., SQS, Service Bus)
    * **Justification:** Decouples the fast chat application from slower external systems like the CRM and human agent queues, ensuring the chat experience is not affected by downstream failures or latency.

* **Security:** **Web Application Firewall (WAF)**
    * **Justification:** Essential edge protection against common web exploits and, specifically for AI, against prompt injection attacks.

* **Security:** **Secrets Manager** (or Vault service)
    * **Justification:** Securely stores sensitive credentials (e.g., CRM API keys), injecting them into the compute environment at runtime using IAM roles, thereby avoiding hardcoded secrets.
"#;

/// Section 4: what generalizes across projects and how the system learns.
pub const REUSABILITY: &str = r#"
## REUSABILITY & IMPROVEMENT

### Standardization vs. Customization
The **Agent Workflow and Interfaces** are standardized, while the **NFR values and Service Tiers** are customized.

* **Standardize (Fixed Components):**
    * The 5-agent pipeline (RA -> DIA/CIA/SIA -> RCA) and their specific JSON input/output schemas.
    * A minimum **Security Baseline** (e.g., IAM roles, PII encryption) enforced by the SIA for every project.
* **Customize (Variable Inputs):**
    * Target **Cloud Vendor** (AWS/Azure/GCP) and **Budget Tier** (Startup, Enterprise).
    * Specific **NFR Values** derived by the RA (e.g., `500ms` latency vs. `200ms` latency).

### Learning and Feedback Mechanisms

1.  **Human Overrides (The Core Learning Data):** The most valuable learning comes from **architectural changes** made *after* the RCA recommendation. If a human architect manually overrides the recommendation (e.g., rejects NoSQL and chooses Managed PostgreSQL, with the reason "Required for existing BI reporting tools"), this labeled delta is fed back into the RCA's model.
2.  **RCA Refinement Engine:** The **Resource Cost & Synthesis Agent (RCA)** is periodically fine-tuned on this dataset of successful and overridden recommendations. This teaches the RCA to adjust its conflict resolution logic—for instance, learning that when the word "Reporting" is a high-priority FR, it should preemptively favor relational databases despite higher cost.
3.  **Deployment Metrics:** Collecting and correlating actual runtime data (e.g., measured monthly cost vs. predicted cost; observed latency vs. NFR latency) from deployed solutions back to the RCA's initial predictions improves the accuracy of future cost estimates and service sizing.
"#;

/// Section 5: expected operational challenges and their handling.
pub const PRACTICAL_CONSIDERATIONS: &str = r#"
## PRACTICAL CONSIDERATIONS

* **Conflicting Recommendations:**
    * **Handling:** The **Resource Cost & Synthesis Agent (RCA)** is the single mediator with **Hierarchical Weighting**. Priority is strictly: **Security (SIA) > NFR Compliance (Latency/Load) > Cost**. If cost conflicts with latency NFR, latency wins, and the cost is documented.

* **Incomplete or Vague Problem Statements:**
    * **Handling:** The **Requirements Analyst (RA)** uses a mandatory validation check. If key NFRs (like expected max load or target latency) are missing, the RA will output a structured **Clarification Request** back to the user instead of proceeding, pausing the pipeline until the essential data is acquired.

* **Budget Constraints not mentioned:**
    * **Handling:** The RCA provides a **Tiered Recommendation Output**. It generates two full solutions: the **Performance Recommended** (meets all NFRs optimally, highest cost) and the **Cost-Optimized** (cheapest viable architecture, may slightly miss non-critical NFRs). This frames the cost vs. performance trade-off for the human architect.

* **Integration with existing legacy systems:**
    * **Handling:** The **Data & Integration Agent (DIA)** is trained to identify patterns for legacy integration. It is instructed to recommend implementing a robust **Queue/Broker (e.g., Kafka)** for guaranteed messaging, or an dedicated **Adapter Microservice** (often on Containers) to handle protocol translation and data scrubbing, isolating the modern architecture from legacy fragility.

* **Keeping up with new cloud services and pricing:**
    * **Handling:** The RCA is connected to a dynamic **Cloud Pricing API** (or database) that is updated daily. All agents are constrained to recommend **Managed Services First**, reducing reliance on rapidly changing low-level infrastructure specifics, thus making the architecture design more durable.
"#;

/// Section names accepted by [`section`], in rendering order.
pub const SECTION_NAMES: [&str; 5] = [
    "agents",
    "workflow",
    "mapping",
    "reusability",
    "practical",
];

/// Look up one section by name.
pub fn section(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "agents" => Some(AGENT_DESIGN),
        "workflow" => Some(WORKFLOW),
        "mapping" => Some(RESOURCE_MAPPING),
        "reusability" => Some(REUSABILITY),
        "practical" => Some(PRACTICAL_CONSIDERATIONS),
        _ => None,
    }
}

/// The full advisory, sections concatenated in order with separators.
pub fn full_report() -> String {
    [
        AGENT_DESIGN,
        WORKFLOW,
        RESOURCE_MAPPING,
        REUSABILITY,
        PRACTICAL_CONSIDERATIONS,
    ]
    .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_report_renders_all_sections_in_order() {
        let report = full_report();
        let agents = report.find("## AGENT DESIGN").expect("agents");
        let workflow = report.find("## ORCHESTRATION WORKFLOW").expect("workflow");
        let mapping = report.find("## CLOUD RESOURCE MAPPING").expect("mapping");
        let reuse = report.find("## REUSABILITY").expect("reusability");
        let practical = report.find("## PRACTICAL CONSIDERATIONS").expect("practical");

        assert!(agents < workflow);
        assert!(workflow < mapping);
        assert!(mapping < reuse);
        assert!(reuse < practical);
    }

    #[test]
    fn every_named_section_resolves() {
        for name in SECTION_NAMES {
            assert!(section(name).is_some(), "section {} missing", name);
        }
        assert!(section("AGENTS").is_some());
        assert!(section("unknown").is_none());
    }
}
